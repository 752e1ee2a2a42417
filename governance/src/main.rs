#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

use governance_runtime::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Args::parse_and_run().await
}
