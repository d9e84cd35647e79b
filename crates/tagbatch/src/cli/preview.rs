//! The `tagbatch preview` command.

use clap::Args;
use tagbatch_core::prompt::insertion_preview;

/// Arguments for the `preview` command.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Prompt text to insert into
    pub prompt: String,

    /// Segment index for the insertion (clamped to the segment count)
    #[arg(short, long, default_value = "0")]
    pub index: usize,

    /// Print the labelled segments as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the preview command.
pub fn execute(args: PreviewArgs) -> anyhow::Result<()> {
    let preview = insertion_preview(&args.prompt, args.index);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        println!("{preview}");
        println!("index {} of 0..={}", preview.index, preview.max_index);
    }
    Ok(())
}
