//! Structured command builder
//!
//! A command is a program followed by clauses. Absent clauses are simply
//! never pushed, so the rendered form has a continuation marker only on
//! lines that are followed by another clause.

/// A multi-line shell command under construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuilder {
    program: String,
    clauses: Vec<String>,
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            clauses: Vec::new(),
        }
    }

    /// Append a clause; blank clauses are dropped
    pub fn clause(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        if !clause.trim().is_empty() {
            self.clauses.push(clause);
        }
        self
    }

    /// Append a clause only when `condition` holds
    pub fn clause_if(self, condition: bool, clause: impl Into<String>) -> Self {
        if condition {
            self.clause(clause)
        } else {
            self
        }
    }

    /// Append a clause when the value is present
    pub fn clause_opt<T, F>(self, value: Option<T>, render: F) -> Self
    where
        F: FnOnce(T) -> String,
    {
        match value {
            Some(value) => self.clause(render(value)),
            None => self,
        }
    }

    /// Append one clause per item, in iteration order
    pub fn clauses<I, F>(self, items: I, render: F) -> Self
    where
        I: IntoIterator,
        F: Fn(I::Item) -> String,
    {
        items
            .into_iter()
            .fold(self, |builder, item| builder.clause(render(item)))
    }

    /// Clauses in order, without the program
    pub fn clause_list(&self) -> &[String] {
        &self.clauses
    }

    /// Render as continuation lines, each prefixed by `indent`.
    ///
    /// Clauses go one per line, indented one level below the program.
    pub fn render_lines(&self, indent: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.clauses.len() + 1);

        if self.clauses.is_empty() {
            lines.push(format!("{}{}", indent, self.program));
            return lines;
        }

        lines.push(format!("{}{} \\", indent, self.program));
        let last = self.clauses.len() - 1;
        for (i, clause) in self.clauses.iter().enumerate() {
            if i == last {
                lines.push(format!("{}    {}", indent, clause));
            } else {
                lines.push(format!("{}    {} \\", indent, clause));
            }
        }
        lines
    }

    /// Single-line form
    pub fn render_inline(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.clauses.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lines() {
        let cmd = CommandBuilder::new("docker run")
            .clause("-d")
            .clause("--name web_1")
            .clause("nginx");

        assert_eq!(
            cmd.render_lines(""),
            vec!["docker run \\", "    -d \\", "    --name web_1 \\", "    nginx"]
        );
    }

    #[test]
    fn test_absent_clauses_leave_no_trace() {
        let hostname: Option<&str> = None;
        let cmd = CommandBuilder::new("docker run")
            .clause_if(false, "--privileged=true")
            .clause_opt(hostname, |h| format!("--hostname={}", h))
            .clauses(Vec::<String>::new(), |v| format!("-v {}", v))
            .clause("")
            .clause("nginx");

        assert_eq!(cmd.render_lines("  "), vec!["  docker run \\", "      nginx"]);
    }

    #[test]
    fn test_program_only() {
        let cmd = CommandBuilder::new("docker ps");
        assert_eq!(cmd.render_lines(""), vec!["docker ps"]);
        assert_eq!(cmd.render_inline(), "docker ps");
    }

    #[test]
    fn test_render_inline() {
        let cmd = CommandBuilder::new("docker rm").clause("-f").clause("web_1");
        assert_eq!(cmd.render_inline(), "docker rm -f web_1");
        assert_eq!(cmd.clause_list(), ["-f", "web_1"]);
    }
}
