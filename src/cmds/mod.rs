use anyhow::{anyhow, Result};
use clap::Parser;

use crate::entities::PostId;

/// commands of the interactive client. one per line.
#[derive(Debug, Clone, Parser)]
#[clap(name = "post_stats", no_binary_name = true, disable_version_flag = true)]
pub struct Cmd {
    #[clap(subcommand)]
    pub cmd: RootMod,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum RootMod {
    /// mount the stats widget of a post into a new slot.
    #[clap(short_flag = 'o')]
    Open(OpenCmd),

    /// toggle the acting user's like.
    #[clap(short_flag = 'l')]
    Like(SlotCmd),

    /// toggle the acting user's save.
    #[clap(short_flag = 's')]
    Save(SlotCmd),

    /// render one slot, or every slot.
    #[clap(short_flag = 'v')]
    Show(ShowCmd),

    /// unmount a slot. requests in flight are left to finish on their own.
    #[clap(short_flag = 'c')]
    Close(SlotCmd),

    /// refetch the acting user.
    #[clap(short_flag = 'r')]
    Refresh,

    /// exit.
    #[clap(short_flag = 'q')]
    Quit,
}

#[derive(Debug, Clone, clap::Args)]
pub struct OpenCmd {
    #[clap(name = "POST_ID")]
    pub post_id: PostId,

    /// route the widget is rendered on.
    #[clap(long, default_value = "/")]
    pub path: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct SlotCmd {
    /// usize, as printed by `open`
    #[clap(name = "SLOT")]
    pub slot: usize,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ShowCmd {
    /// usize; every slot if omitted
    #[clap(name = "SLOT")]
    pub slot: Option<usize>,
}

/// `Ok(None)` for blank lines.
pub fn parse_line(raw: &str) -> Result<Option<Cmd>> {
    let splitted = ::shell_words::split(raw).map_err(|e| anyhow!(e.to_string()))?;

    if splitted.is_empty() {
        return Ok(None);
    }

    Cmd::try_parse_from(splitted).map(Some).map_err(|e| {
        // clap appends usage; the first line is enough here
        let msg = e.to_string();
        let first = msg.lines().next().unwrap_or_default();
        anyhow!(first.trim_start_matches("error: ").to_string())
    })
}
