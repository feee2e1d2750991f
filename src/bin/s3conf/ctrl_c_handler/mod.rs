// Cancels the run on Ctrl+C.
//
// Operations already sent to S3 finish; the applier skips the rest.

use s3conf_rs::RunCancellationToken;
use tokio::task::JoinHandle;
use tokio::{select, signal};
use tracing::{debug, warn};

pub fn spawn_ctrl_c_handler(cancellation_token: RunCancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        select! {
            _ = cancellation_token.cancelled() => {
                debug!("cancellation_token canceled.")
            }
            _ = signal::ctrl_c() => {
                warn!("ctrl-c received, remaining operations will be skipped.");
                cancellation_token.cancel();
            }
        }
    })
}
