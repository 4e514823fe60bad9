//! Launch script assembly
//!
//! A script pulls the image, removes any container already using the
//! service's container name, then starts a fresh one. In interactive mode
//! the start step branches on the script's first argument.

use crate::config::BatchContext;
use crate::render::clause::CommandBuilder;
use crate::render::links::ResolvedService;
use crate::shell::{quote, quote_expandable, single_quote};
use serde::Serialize;

/// Script argument that selects the foreground branch
pub const INTERACTIVE_FLAG: &str = "-i";

/// How the container is started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Restarting, detached container
    Detached,
    /// Foreground container with a terminal, running the batch shell
    Foreground,
}

/// A finished launch script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchArtifact {
    /// Target file name, `{app}-{service}.1.sh`
    pub file_name: String,
    /// The resolved service the script launches
    pub service: ResolvedService,
    /// Script text
    pub content: String,
}

/// Docker invocation prefix, including the remote host if any
fn docker(ctx: &BatchContext) -> String {
    match &ctx.host {
        Some(host) => format!("{} -H {}", quote(&ctx.docker), quote(host)),
        None => quote(&ctx.docker).into_owned(),
    }
}

/// Build the `docker run` command for a service
pub fn run_command(service: &ResolvedService, ctx: &BatchContext, mode: RunMode) -> CommandBuilder {
    let spec = &service.spec;
    let foreground = mode == RunMode::Foreground;

    let builder = CommandBuilder::new(format!("{} run", docker(ctx)))
        .clause_if(spec.privileged, "--privileged=true")
        .clause_if(!foreground, "--restart=always")
        .clause_if(!foreground, "-d")
        .clause_if(foreground, "-i -t")
        .clause(format!("--name {}", quote(&service.container_name)))
        .clause_opt(spec.hostname.as_deref(), |h| format!("--hostname={}", quote(h)))
        .clause_opt(spec.network.as_deref(), |n| format!("--net={}", quote(n)))
        .clauses(&spec.volumes, |v| format!("-v {}", quote_expandable(v)))
        .clauses(&spec.links, |l| format!("--link {}", quote(l)))
        .clauses(&spec.environment, |(k, v)| {
            format!("-e {}={}", quote(k), single_quote(v))
        })
        .clauses(&spec.ports, |p| format!("-p {}", quote(p)))
        .clauses(&spec.env_files, |f| format!("--env-file {}", quote(f)))
        .clause_opt(spec.log_driver.as_deref(), |d| format!("--log-driver={}", quote(d)))
        .clauses(&spec.log_options, |(k, v)| {
            format!("--log-opt {}", quote(&format!("{}={}", k, v)))
        });

    let shell = quote(&ctx.shell);
    let entry = if foreground {
        Some(shell.as_ref())
    } else {
        spec.command.as_deref().filter(|c| !c.trim().is_empty())
    };

    match entry {
        Some(entry) => builder.clause(format!("{} {}", quote(&spec.image), entry)),
        None => builder.clause(quote(&spec.image).into_owned()),
    }
}

/// Render the complete launch script for a resolved service
pub fn render(service: &ResolvedService, ctx: &BatchContext) -> Result<LaunchArtifact, RenderError> {
    let spec = &service.spec;
    if spec.image.trim().is_empty() {
        return Err(RenderError::MissingImage);
    }

    let docker = docker(ctx);
    let container = quote(&service.container_name);

    let mut lines = vec![
        "#!/bin/bash".to_string(),
        format!("{} pull {}", docker, quote(&spec.image)),
        format!(
            "if {} inspect --type=container {} > /dev/null 2>&1; then",
            docker, container
        ),
        format!("    {} rm -f {}", docker, container),
        "fi".to_string(),
    ];

    let detached = run_command(service, ctx, RunMode::Detached);
    if ctx.interactive {
        let foreground = run_command(service, ctx, RunMode::Foreground);
        lines.push(format!("if [ \"$1\" = \"{}\" ]; then", INTERACTIVE_FLAG));
        lines.extend(foreground.render_lines("    "));
        lines.push("else".to_string());
        lines.extend(detached.render_lines("    "));
        lines.push("fi".to_string());
    } else {
        lines.extend(detached.render_lines(""));
    }

    let mut content = lines.join("\n");
    content.push('\n');

    Ok(LaunchArtifact {
        file_name: ctx.script_name(&service.raw_name),
        service: service.clone(),
        content,
    })
}

/// Errors that make a service unrenderable
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no image declared")]
    MissingImage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceSpec;
    use crate::render::links::resolve_service;

    fn resolved(spec: ServiceSpec, ctx: &BatchContext) -> ResolvedService {
        resolve_service(spec, ctx).unwrap()
    }

    fn web(image: &str) -> ServiceSpec {
        ServiceSpec {
            name: "web".to_string(),
            image: image.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_script() {
        let ctx = BatchContext::new("myapp").unwrap();
        let artifact = render(&resolved(web("nginx"), &ctx), &ctx).unwrap();

        assert_eq!(artifact.file_name, "myapp-web.1.sh");
        assert_eq!(
            artifact.content,
            "#!/bin/bash\n\
             /usr/bin/docker pull nginx\n\
             if /usr/bin/docker inspect --type=container myapp-web_1 > /dev/null 2>&1; then\n\
             \x20   /usr/bin/docker rm -f myapp-web_1\n\
             fi\n\
             /usr/bin/docker run \\\n\
             \x20   --restart=always \\\n\
             \x20   -d \\\n\
             \x20   --name myapp-web_1 \\\n\
             \x20   nginx\n"
        );
    }

    #[test]
    fn test_clause_order() {
        let ctx = BatchContext::new("x").unwrap();
        let spec = ServiceSpec {
            privileged: true,
            command: Some("serve --port 80".to_string()),
            hostname: Some("web.local".to_string()),
            network: Some("bridge".to_string()),
            volumes: vec!["/a:/a".to_string(), "/b:/b".to_string()],
            links: vec!["db".to_string()],
            environment: [("B".to_string(), "2".to_string()), ("A".to_string(), "one two".to_string())]
                .into_iter()
                .collect(),
            ports: vec!["80:80".to_string()],
            env_files: vec!["web.env".to_string()],
            log_driver: Some("syslog".to_string()),
            log_options: [("tag".to_string(), "web".to_string())].into_iter().collect(),
            ..web("app")
        };

        let cmd = run_command(&resolved(spec, &ctx), &ctx, RunMode::Detached);
        assert_eq!(
            cmd.clause_list(),
            [
                "--privileged=true",
                "--restart=always",
                "-d",
                "--name x-web_1",
                "--hostname=web.local",
                "--net=bridge",
                "-v /a:/a",
                "-v /b:/b",
                "--link x-db_1:x-db_1",
                "-e A='one two'",
                "-e B='2'",
                "-p 80:80",
                "--env-file web.env",
                "--log-driver=syslog",
                "--log-opt tag=web",
                "app serve --port 80",
            ]
        );
    }

    #[test]
    fn test_missing_image() {
        let ctx = BatchContext::new("x").unwrap();
        let result = render(&resolved(web(""), &ctx), &ctx);
        assert!(matches!(result, Err(RenderError::MissingImage)));
    }

    #[test]
    fn test_remote_host() {
        let ctx = BatchContext::new("x").unwrap().with_host("tcp://10.0.0.5:2375");
        let artifact = render(&resolved(web("nginx"), &ctx), &ctx).unwrap();

        assert!(artifact
            .content
            .contains("/usr/bin/docker -H tcp://10.0.0.5:2375 pull nginx\n"));
        assert!(artifact
            .content
            .contains("/usr/bin/docker -H tcp://10.0.0.5:2375 rm -f x-web_1\n"));
        assert!(artifact
            .content
            .contains("/usr/bin/docker -H tcp://10.0.0.5:2375 run \\\n"));
    }

    #[test]
    fn test_interactive_branches() {
        let ctx = BatchContext::new("x").unwrap().with_interactive(true);
        let spec = ServiceSpec {
            command: Some("serve".to_string()),
            ..web("app")
        };
        let artifact = render(&resolved(spec, &ctx), &ctx).unwrap();
        let content = &artifact.content;

        let branch = content.find("if [ \"$1\" = \"-i\" ]; then").unwrap();
        let otherwise = content.find("\nelse\n").unwrap();
        let interactive = &content[branch..otherwise];
        let detached = &content[otherwise..];

        assert!(interactive.contains("-i -t"));
        assert!(interactive.contains("app /bin/bash"));
        assert!(!interactive.contains("--restart"));
        assert!(!interactive.contains(" -d "));
        assert!(detached.contains("--restart=always"));
        assert!(detached.contains("app serve"));
        assert!(content.ends_with("fi\n"));
    }

    #[test]
    fn test_custom_shell_and_docker() {
        let ctx = BatchContext::new("x")
            .unwrap()
            .with_interactive(true)
            .with_shell("/bin/sh")
            .with_docker("docker");
        let artifact = render(&resolved(web("alpine"), &ctx), &ctx).unwrap();

        assert!(artifact.content.contains("alpine /bin/sh"));
        assert!(artifact.content.contains("\ndocker pull alpine\n"));
    }

    #[test]
    fn test_paths_with_spaces_are_quoted() {
        let ctx = BatchContext::new("x")
            .unwrap()
            .with_interactive(true)
            .with_shell("/opt/my tools/sh")
            .with_docker("/opt/docker ce/docker")
            .with_host("tcp://swarm:2375");
        let artifact = render(&resolved(web("alpine"), &ctx), &ctx).unwrap();

        assert!(artifact
            .content
            .contains("\n'/opt/docker ce/docker' -H tcp://swarm:2375 pull alpine\n"));
        assert!(artifact
            .content
            .contains("    '/opt/docker ce/docker' -H tcp://swarm:2375 rm -f x-web_1\n"));
        assert!(artifact.content.contains("alpine '/opt/my tools/sh'\n"));
    }

    #[test]
    fn test_volumes_keep_host_expansion() {
        let ctx = BatchContext::new("x").unwrap();
        let spec = ServiceSpec {
            volumes: vec![
                "~/data:/data".to_string(),
                "$PWD/conf:/conf".to_string(),
                "/srv/my files:/files".to_string(),
            ],
            ..web("app")
        };
        let cmd = run_command(&resolved(spec, &ctx), &ctx, RunMode::Detached);
        let clauses = cmd.clause_list();

        assert!(clauses.contains(&"-v ~/data:/data".to_string()));
        assert!(clauses.contains(&"-v $PWD/conf:/conf".to_string()));
        assert!(clauses.contains(&"-v \"/srv/my files:/files\"".to_string()));
    }

    #[test]
    fn test_no_dangling_continuations() {
        let ctx = BatchContext::new("x").unwrap().with_interactive(true);
        let artifact = render(&resolved(web("nginx"), &ctx), &ctx).unwrap();
        let lines: Vec<&str> = artifact.content.lines().collect();

        for (i, line) in lines.iter().enumerate() {
            assert_ne!(line.trim(), "\\");
            if line.ends_with('\\') {
                let next = lines.get(i + 1).map(|l| l.trim()).unwrap_or("");
                assert!(!next.is_empty(), "continuation at line {} has no follower", i);
                assert!(next != "else" && next != "fi");
            }
        }
    }

    #[test]
    fn test_env_value_quoting() {
        let ctx = BatchContext::new("x").unwrap();
        let spec = ServiceSpec {
            environment: [("MSG".to_string(), "it's $HOME".to_string())]
                .into_iter()
                .collect(),
            ..web("app")
        };
        let cmd = run_command(&resolved(spec, &ctx), &ctx, RunMode::Detached);
        assert!(cmd
            .clause_list()
            .contains(&"-e MSG='it'\\''s $HOME'".to_string()));
    }
}
