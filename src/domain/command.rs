use std::fmt;

const MASK: &str = "********";

/// Flags whose following value never appears in rendered output.
const SECRET_FLAGS: &[&str] = &["--password"];

/// One invocation of the btp CLI, kept as an argument vector so nothing is
/// re-parsed by a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtpCommand {
    args: Vec<String>,
}

impl BtpCommand {
    /// Plain invocation: `btp <verb> <object>`.
    pub fn new(verb: &str, object: &str) -> Self {
        Self {
            args: vec![verb.to_string(), object.to_string()],
        }
    }

    /// Invocation with `--format json` placed before the verb.
    pub fn json(verb: &str, object: &str) -> Self {
        Self {
            args: vec![
                "--format".to_string(),
                "json".to_string(),
                verb.to_string(),
                object.to_string(),
            ],
        }
    }

    /// `btp login` takes no object.
    pub fn login() -> Self {
        Self {
            args: vec!["login".to_string()],
        }
    }

    pub fn arg(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.args.push(flag.to_string());
        self.args.push(value.into());
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Value passed for `flag`, if any.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Shell-like rendering with secrets masked.
    pub fn render(&self, program: &str) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote(program));

        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                parts.push(MASK.to_string());
                mask_next = false;
                continue;
            }
            mask_next = SECRET_FLAGS.contains(&arg.as_str());
            parts.push(quote(arg));
        }

        parts.join(" ")
    }
}

impl fmt::Display for BtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render("btp"))
    }
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
