//! Command-line interface for figlaunch

use crate::config::{BatchContext, ContextError, LinkPolicy, DEFAULT_DOCKER, DEFAULT_SHELL};
use argh::FromArgs;

/// Generate idempotent docker launch scripts from a fig definition
#[derive(FromArgs, Debug)]
pub struct LaunchArgs {
    /// application name used to namespace containers (required)
    #[argh(option, short = 'a')]
    pub app: Option<String>,

    /// path to the definition file (default: fig.yml)
    #[argh(option, short = 'f', default = "String::from(\"fig.yml\")")]
    pub fig: String,

    /// output directory for generated scripts (default: .)
    #[argh(option, short = 'o', default = "String::from(\".\")")]
    pub output: String,

    /// remote docker host, passed as -H to every docker call
    #[argh(option, short = 'H', from_str_fn(parse_host))]
    pub host: Option<String>,

    /// generate scripts that run the container in the foreground when given -i
    #[argh(switch, short = 'i')]
    pub interactive: bool,

    /// shell started by the interactive branch (default: /bin/bash)
    #[argh(option, default = "String::from(DEFAULT_SHELL)")]
    pub shell: String,

    /// docker binary invoked by the scripts (default: /usr/bin/docker)
    #[argh(option, default = "String::from(DEFAULT_DOCKER)")]
    pub docker: String,

    /// accept links to services that are not in the definition
    #[argh(switch)]
    pub allow_dangling_links: bool,

    /// print scripts instead of writing them
    #[argh(switch)]
    pub dry_run: bool,

    /// with --dry-run or --validate, print the translated batch as JSON
    #[argh(switch)]
    pub json: bool,

    /// validate the definition and exit
    #[argh(switch)]
    pub validate: bool,

    /// print version information and exit
    #[argh(switch, short = 'v')]
    pub version: bool,

    /// log level (error, warn, info, debug, trace)
    #[argh(option, short = 'l', default = "String::from(\"info\")")]
    pub log_level: String,
}

/// Parse a docker host; must be non-empty and contain no whitespace
fn parse_host(s: &str) -> Result<String, String> {
    let host = s.trim();
    if host.is_empty() {
        return Err("Docker host must not be empty".to_string());
    }
    if host.chars().any(char::is_whitespace) {
        return Err(format!("Invalid docker host '{}': contains whitespace", s));
    }
    Ok(host.to_string())
}

impl LaunchArgs {
    /// Link policy selected on the command line
    pub fn link_policy(&self) -> LinkPolicy {
        if self.allow_dangling_links {
            LinkPolicy::Lenient
        } else {
            LinkPolicy::Strict
        }
    }

    /// Build the batch context from the flags
    pub fn batch_context(&self) -> Result<BatchContext, ContextError> {
        let app = self.app.as_deref().ok_or(ContextError::MissingAppName)?;

        let mut ctx = BatchContext::new(app.trim())?
            .with_interactive(self.interactive)
            .with_shell(self.shell.clone())
            .with_docker(self.docker.clone())
            .with_link_policy(self.link_policy());

        if let Some(ref host) = self.host {
            ctx = ctx.with_host(host.clone());
        }

        Ok(ctx)
    }
}
