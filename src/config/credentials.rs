use tracing::debug;

/// Resolve a credential value. If the value starts with '$', treat it as an
/// environment variable reference and resolve from the environment.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Replace each known secret in `text` with [REDACTED]. Secrets shorter than
/// four characters are left alone.
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}

/// Mask `--password=X` and `-pX` style arguments in a dump command line.
pub fn redact_command(command: &str) -> String {
    command
        .split(' ')
        .map(|arg| {
            if arg.starts_with("--password=") {
                "--password=[REDACTED]".to_string()
            } else if arg.len() > 2 && arg.starts_with("-p") && !arg.starts_with("-p=") && !arg.starts_with("--") {
                "-p[REDACTED]".to_string()
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
