use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::ConnectionProbe;
use super::DeliveryController;
use crate::domain::models::Action;
use crate::domain::models::Event;

/// Background side of the chat UI. Runs deliveries and connection probes
/// off the UI task and reports back through events.
pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        controller: DeliveryController,
        probe: ConnectionProbe,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        // Lazy default.
        let mut worker: JoinHandle<Result<()>> = tokio::spawn(async {
            return Ok(());
        });

        while let Some(action) = rx.recv().await {
            match action {
                Action::DeliveryAbort() => {
                    worker.abort();
                }
                Action::DeliveryRequest(request) => {
                    let worker_tx = tx.clone();
                    let worker_controller = controller.clone();
                    worker = tokio::spawn(async move {
                        let reply = worker_controller.deliver(&request, &worker_tx).await;
                        worker_tx.send(Event::DeliveryComplete(reply))?;

                        return Ok(());
                    });
                }
                Action::ProbeApi() => {
                    probe.run(&tx).await?;
                }
            }
        }

        return Ok(());
    }
}
