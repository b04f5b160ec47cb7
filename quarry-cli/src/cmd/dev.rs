use anyhow::Result;
use quarry_core::Page;
use quarry_core::config::Config;
use quarry_dev_server::DevLoop;

pub async fn execute(config: Config, pages: Vec<Page>) -> Result<()> {
    let running = DevLoop::new(config, pages).start().await?;
    println!("Serving at http://{} (Ctrl-C to stop)", running.local_addr());

    running
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
