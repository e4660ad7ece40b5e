use clap::Parser;

/// Mood journal CLI arguments. Each flag overrides its environment variable.
#[derive(Debug, Parser)]
#[command(
    name = "mood-journal",
    version,
    about = "Mood journaling API with AI sentiment and energy analysis"
)]
pub struct Cli {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long)]
    pub bind: Option<String>,

    /// Analysis provider (gemini or openai)
    #[arg(long)]
    pub provider: Option<String>,

    /// Provider model name
    #[arg(long)]
    pub model: Option<String>,

    /// Upper bound on one analysis call, in seconds
    #[arg(long)]
    pub analysis_timeout: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::parse_from([
            "mood-journal",
            "--bind",
            "127.0.0.1:7000",
            "--provider",
            "openai",
            "--analysis-timeout",
            "4",
        ]);
        assert_eq!(cli.bind.as_deref(), Some("127.0.0.1:7000"));
        assert_eq!(cli.provider.as_deref(), Some("openai"));
        assert_eq!(cli.model, None);
        assert_eq!(cli.analysis_timeout, Some(4));
    }
}
