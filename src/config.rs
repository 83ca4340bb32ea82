use crate::player::PlayerCommand;
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_READER: &str = "ar.abdulbasitmurattal";

/// Settings shared by every subcommand; flags win over the environment.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Base url of the alquran.cloud api
    #[arg(long, global = true, env = "TILAWA_API_BASE", default_value = crate::api::DEFAULT_BASE)]
    pub api_base: String,

    /// Reader edition id (e.g. ar.alafasy) or reader name
    #[arg(long, global = true, env = "TILAWA_READER", default_value = DEFAULT_READER)]
    pub reader: String,

    /// Player command; {url} and {start} (seconds) are filled in per verse
    #[arg(long, global = true, env = "TILAWA_PLAYER", default_value = crate::player::DEFAULT_PLAYER)]
    pub player: PlayerCommand,

    /// Where downloaded verses are saved
    #[arg(long, global = true, env = "TILAWA_OUT", default_value = "~/Music/Quran")]
    pub out: String,
}

impl Config {
    pub fn out_dir(&self) -> PathBuf {
        PathBuf::from(expand_tilde(&self.out))
    }
}

pub fn expand_tilde(p: &str) -> String {
    if let Some(rest) = p.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest).to_string_lossy().to_string();
        }
    }
    p.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Flags {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn defaults_parse() {
        let p = Flags::try_parse_from(["tilawa"]).unwrap();
        assert_eq!(p.config.player, crate::player::DEFAULT_PLAYER.parse::<PlayerCommand>().unwrap());
        assert!(p.config.api_base.starts_with("https://"));
    }

    #[test]
    fn bad_player_is_rejected() {
        assert!(Flags::try_parse_from(["tilawa", "--player", "mpv --start={start}"]).is_err());
    }

    #[test]
    fn paths_without_tilde_are_untouched() {
        assert_eq!(expand_tilde("/tmp/q"), "/tmp/q");
        assert_eq!(expand_tilde("q/~/x"), "q/~/x");
    }
}
