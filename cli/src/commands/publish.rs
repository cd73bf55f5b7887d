use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::Session;
use crate::ux_error;

#[derive(Args)]
pub struct PublishArgs {
    #[arg(long, help = "Print the published summary")]
    pub print: bool
}

pub async fn run(session: Session, args: PublishArgs) -> Result<()> {
    let summary = session.memory.publish().await.map_err(ux_error::report)?;

    if args.print {
        print!("{}", summary.content);
    } else {
        output::success(&format!("Published {} ({})", summary.path, &summary.hash[..12]));
    }
    Ok(())
}
