mod handler;
mod io;
mod protocol;

use tokio::sync::mpsc;

use crate::{cli::Args, error::AppResult};

use handler::BridgeHandler;
use io::{NdjsonReader, NdjsonWriter};
use protocol::{BridgeRequest, BridgeResponse, PROTOCOL_VERSION};

pub fn run(args: Args) -> AppResult<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| crate::error::AppError::Internal(e.to_string()))?;

    rt.block_on(async move {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut input = NdjsonReader::new();
        let mut output = NdjsonWriter::new();
        let mut handler = BridgeHandler::new(&args, tx);

        if let Some(path) = &args.db_path {
            let event = handler.open_on_start(path).await;
            output.write_json_line(&event).await?;
        }

        loop {
            tokio::select! {
                line = input.read_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }

                    let req: BridgeRequest = match serde_json::from_str(&line) {
                        Ok(r) => r,
                        Err(e) => {
                            let resp = BridgeResponse::<()>::err(PROTOCOL_VERSION, String::new(), "INVALID_REQUEST", e.to_string());
                            output.write_json_line(&resp).await?;
                            continue;
                        }
                    };

                    let resp = handler.handle(req).await;
                    output.write_json_line(&resp).await?;
                }
                Some(delivery) = rx.recv() => {
                    if let Some(event) = handler.deliver(delivery) {
                        output.write_json_line(&event).await?;
                    }
                }
            }
        }

        tracing::info!("stdin closed; shutting down");
        Ok(())
    })
}
