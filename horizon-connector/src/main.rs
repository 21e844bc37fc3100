use anyhow::Result;
use async_trait::async_trait;
use horizon_connector::records::Effect;
use horizon_connector::{load_config, Cursor, RecordHandler, StreamClient};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Forwards delivered records into the consumer channel. Cursor
/// checkpointing, if needed, belongs on this side of the seam; the engine
/// never persists positions itself.
struct ChannelHandler {
    tx: mpsc::Sender<Effect>,
}

#[async_trait]
impl RecordHandler<Effect> for ChannelHandler {
    async fn on_record(&mut self, record: Effect) -> Result<()> {
        self.tx
            .send(record)
            .await
            .map_err(|_| anyhow::anyhow!("record consumer dropped"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = load_config(&config_path)?;
    horizon_logger::init(&config.log)?;
    tracing::info!("{:#?}", config);

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, shutting down");
            ctrl_c_cancel.cancel();
        }
    });

    let (tx, mut rx) = mpsc::channel::<Effect>(config.channels.record_buffer);
    let consumer = tokio::spawn(async move {
        while let Some(effect) = rx.recv().await {
            let base = effect.base();
            tracing::info!(
                id = %base.id,
                kind = %base.effect_type,
                cursor = %base.paging_token,
                "effect received"
            );
        }
    });

    let cursor = config.horizon.start_cursor.clone().map(Cursor);
    let client = StreamClient::new(&config)?;
    let outcome = client
        .stream_effects(cursor, ChannelHandler { tx }, cancel)
        .await;

    consumer.await?;
    outcome?;
    Ok(())
}
