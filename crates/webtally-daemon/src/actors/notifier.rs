use notify_rust::{Notification, Urgency};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use webtally_core::NotificationUrgency;

const APPLICATION_NAME: &str = "webtally";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierMessage {
    Show {
        id: String,
        title: String,
        body: String,
    },
    PersistenceFailure {
        domain: String,
        seconds: i64,
    },
}

#[derive(Clone)]
pub struct NotifierHandle {
    sender: mpsc::Sender<NotifierMessage>,
}

impl NotifierHandle {
    pub fn show(&self, id: &str, title: &str, body: &str) {
        self.dispatch(NotifierMessage::Show {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    pub fn send_persistence_failure(&self, domain: &str, seconds: i64) {
        self.dispatch(NotifierMessage::PersistenceFailure {
            domain: domain.to_string(),
            seconds,
        });
    }

    fn dispatch(&self, message: NotifierMessage) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if let Err(error) = sender.send(message).await {
                error!(%error, "failed to send notification message");
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn channel() -> (Self, mpsc::Receiver<NotifierMessage>) {
        let (sender, receiver) = mpsc::channel(32);
        (Self { sender }, receiver)
    }
}

pub struct NotifierActor {
    receiver: mpsc::Receiver<NotifierMessage>,
    urgency: Urgency,
    sound_enabled: bool,
}

impl NotifierActor {
    pub fn new(urgency: NotificationUrgency, sound_enabled: bool) -> (Self, NotifierHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let urgency = match urgency {
            NotificationUrgency::Low => Urgency::Low,
            NotificationUrgency::Normal => Urgency::Normal,
            NotificationUrgency::Critical => Urgency::Critical,
        };

        let actor = Self {
            receiver,
            urgency,
            sound_enabled,
        };

        let handle = NotifierHandle { sender };

        (actor, handle)
    }

    pub async fn run(mut self) {
        info!("notifier actor started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                NotifierMessage::Show { id, title, body } => {
                    self.show_notification(&id, &title, &body);
                }
                NotifierMessage::PersistenceFailure { domain, seconds } => {
                    let body = format!(
                        "{}s on {} could not be saved. Check the usage database.",
                        seconds, domain
                    );
                    self.show_notification("persistence_error", "Usage not saved", &body);
                }
            }
        }

        debug!("notifier actor stopped");
    }

    fn show_notification(&self, id: &str, title: &str, body: &str) {
        match self.build_notification(title, body).show() {
            Ok(_) => {
                debug!(id, "notification sent");
            }
            Err(error) => {
                warn!(%error, id, "failed to show notification");
            }
        }
    }

    fn build_notification(&self, summary: &str, body: &str) -> Notification {
        let mut notification = Notification::new();
        notification
            .summary(summary)
            .body(body)
            .urgency(self.urgency)
            .appname(APPLICATION_NAME);

        if self.sound_enabled {
            notification.sound_name("message-new-instant");
        }

        notification
    }
}
