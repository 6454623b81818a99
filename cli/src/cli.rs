use clap::{Args, Parser};
use rzmq_pubrouter::config::{DEFAULT_HOST, DEFAULT_PUB_PORT, DEFAULT_ROUTER_PORT, DEFAULT_TOPIC};

#[derive(Parser, Debug)]
#[clap(name = "rzmq-hello", version, about = "PUB/SUB and DEALER/ROUTER greeting demo over rzmq")]
pub struct Cli {
  #[clap(subcommand)]
  pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
  /// Run the ROUTER (binds, listens for commands) and the PUBLISHER (connects, broadcasts the greeting)
  PubRouter(PubRouterArgs),
  /// Run a DEALER that periodically tells the ROUTER to change language
  Dealer(DealerArgs),
  /// Run a SUBSCRIBER that binds and prints every greeting on its topic
  Sub(SubArgs),
}

/// Retry settings shared by every role.
#[derive(Args, Debug, Clone)]
pub struct RetryArgs {
  /// Restart a role this many times after a recoverable transport failure (0 = stop on first failure)
  #[clap(long, default_value_t = 0)]
  pub retries: u32,
}

#[derive(Args, Debug, Clone)]
pub struct PubRouterArgs {
  /// Host of the subscriber to connect to and send messages to
  #[clap(long, default_value = DEFAULT_HOST)]
  pub sub_host: String,

  /// Port of the subscriber to connect to and send messages to
  #[clap(long, default_value_t = DEFAULT_PUB_PORT)]
  pub sub_port: u16,

  /// Host the router binds to listen for commands
  #[clap(long, default_value = DEFAULT_HOST)]
  pub router_host: String,

  /// Port the router binds to listen for commands
  #[clap(long, default_value_t = DEFAULT_ROUTER_PORT)]
  pub router_port: u16,

  /// Topic the greeting is published under
  #[clap(long, default_value = DEFAULT_TOPIC)]
  pub topic: String,

  /// Milliseconds between broadcasts
  #[clap(long, default_value_t = 500)]
  pub interval_ms: u64,

  /// Milliseconds to wait after connecting before the first broadcast (minimum 200)
  #[clap(long, default_value_t = 300)]
  pub grace_ms: u64,

  #[clap(flatten)]
  pub retry: RetryArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DealerArgs {
  /// Host of the router
  #[clap(long, default_value = DEFAULT_HOST)]
  pub host: String,

  /// Port of the router
  #[clap(long, default_value_t = DEFAULT_ROUTER_PORT)]
  pub port: u16,

  /// Routing identity presented to the router
  #[clap(long, default_value = "lang_dealer")]
  pub identity: String,

  /// Command payload sent on every tick
  #[clap(long, default_value = "Change that language!")]
  pub message: String,

  /// Milliseconds between commands
  #[clap(long, default_value_t = 2000)]
  pub interval_ms: u64,

  /// Milliseconds to wait after connecting before the first command (minimum 200)
  #[clap(long, default_value_t = 300)]
  pub grace_ms: u64,

  #[clap(flatten)]
  pub retry: RetryArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SubArgs {
  /// Host of publisher to subscribe to
  #[clap(long, default_value = DEFAULT_HOST)]
  pub host: String,

  /// Port of publisher to subscribe to
  #[clap(long, default_value_t = DEFAULT_PUB_PORT)]
  pub port: u16,

  /// Topic prefix to subscribe to
  #[clap(long, default_value = DEFAULT_TOPIC)]
  pub topic: String,

  /// Connect to the publisher instead of binding
  #[clap(long, action)]
  pub connect: bool,

  #[clap(flatten)]
  pub retry: RetryArgs,
}
