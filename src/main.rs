// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use light_effects::config::load_profile;
use light_effects::device::mock;
use light_effects::effects::Completion;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Timed lighting effects."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs an effect profile against a logging mock light until it completes or Ctrl-C.
    Run {
        /// The path to the effect profile.
        profile_path: PathBuf,
        /// The name of the mock light.
        #[arg(short, long, default_value = "mock-light")]
        light_name: String,
        /// Starts the mock light switched off.
        #[arg(long)]
        off: bool,
    },
    /// Parses and validates an effect profile.
    Validate {
        /// The path to the effect profile.
        profile_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            profile_path,
            light_name,
            off,
        } => {
            let profile = load_profile(&profile_path)?;
            let light = mock::Light::logging(&light_name);
            light.set_on(!off);

            let (done_tx, done_rx) = oneshot::channel::<Completion>();
            let done_tx = Mutex::new(Some(done_tx));
            let effect = profile.build_with_callback(Arc::new(light.clone()), move |completion| {
                if let Some(done_tx) = done_tx.lock().take() {
                    let _ = done_tx.send(completion.clone());
                }
            })?;

            effect.start()?;
            info!(%effect, "Running effect, press Ctrl-C to stop.");

            let completion = tokio::select! {
                completion = done_rx => completion?,
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    info!("Interrupted, stopping effect.");
                    effect.stop();
                    Completion::Stopped
                }
            };

            println!(
                "{} ended ({:?}) after {} writes.",
                effect,
                completion,
                light.write_count()
            );
        }
        Commands::Validate { profile_path } => {
            let profile = load_profile(&profile_path)?;
            let effect = profile.build(Arc::new(mock::Light::new("validate")))?;
            println!("{} profile is valid:", profile.kind());
            println!("{:#?}", effect.policy());
        }
    }

    Ok(())
}
