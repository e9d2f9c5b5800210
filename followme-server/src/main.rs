use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod client;
mod context;
mod server;

use client::run_client;
use server::run_server;

#[derive(Parser, Debug, Clone)]
#[command(name = "followme")]
#[command(author, version, about = "Follow-me interaction demo for the TEO humanoid")]
pub struct Args {
    /// Mode: "server" or "client"
    #[arg(long, default_value = "server")]
    pub mode: String,

    /// Dialogue language: "english" or "spanish"
    #[arg(long, default_value = "english")]
    pub language: String,

    /// "on" listens for voice commands, "off" runs the scripted demo
    #[arg(long, default_value = "off")]
    pub micro: String,

    /// Address of the command channel
    #[arg(long, default_value = "127.0.0.1:9011")]
    pub rpc_addr: String,

    /// UDP address receiving vision and speech over OSC
    #[arg(long, default_value = "127.0.0.1:9010")]
    pub osc_addr: String,

    /// Sequencer tick period in milliseconds
    #[arg(long, default_value_t = 100)]
    pub tick_ms: u64,

    /// Supervisor period in milliseconds
    #[arg(long, default_value_t = 500)]
    pub supervisor_ms: u64,

    /// Head tracking deadband in meters
    #[arg(long, default_value_t = 0.03)]
    pub deadband: f64,

    /// Head correction per observation in degrees
    #[arg(long, default_value_t = 2.0)]
    pub increment: f64,

    /// Treat an arm motion as done after this many milliseconds
    #[arg(long)]
    pub motion_timeout_ms: Option<u64>,

    /// Time scale of the simulated joints (1.0 = real time)
    #[arg(long, default_value_t = 1.0)]
    pub sim_time_scale: f64,

    /// Simulated speech duration per character, in milliseconds
    #[arg(long, default_value_t = 60)]
    pub tts_char_ms: u64,

    /// Client mode: request line to send, e.g. "salu" or "hear follow me"
    #[arg(long)]
    pub command: Option<String>,

    /// Client mode: vision observation "x,y,depth" sent over OSC
    #[arg(long)]
    pub cv: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("followme=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {:?}", e);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("followme starting. mode={}, language={}, micro={}",
          args.mode, args.language, args.micro);

    match args.mode.as_str() {
        "server" => run_server(args).await?,
        "client" => {
            if let Err(e) = run_client(args).await {
                error!("Client error: {:?}", e);
            }
        }
        other => {
            error!("Invalid mode '{}'. Use --mode=server or --mode=client.", other);
        }
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
