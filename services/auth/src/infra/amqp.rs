use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use chrono::Utc;
use lapin::options::{
    BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::repository::NotificationPublisher;
use crate::error::AuthServiceError;

/// AMQP delivery mode for messages that survive a broker restart.
const PERSISTENT: u8 = 2;

/// Exchange, queue and routing key used for outgoing mail.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub exchange: String,
    pub queue: String,
    pub binding_key: String,
}

/// What a publish has to rebuild before it can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reopen {
    Nothing,
    Channel,
    Connection,
}

fn reopen_plan(connection_up: Option<bool>, channel_up: Option<bool>) -> Reopen {
    match (connection_up, channel_up) {
        (Some(true), Some(true)) => Reopen::Nothing,
        (Some(true), _) => Reopen::Channel,
        _ => Reopen::Connection,
    }
}

#[derive(Default)]
struct Link {
    connection: Option<Connection>,
    channel: Option<Channel>,
}

/// Publishes mail notifications to a durable direct exchange with publisher
/// confirms.
///
/// The broker closes a channel for good after a channel-level error, so a dead
/// channel (or connection) is reopened on the next publish.
#[derive(Clone)]
pub struct AmqpEmailPublisher {
    url: Arc<str>,
    settings: BrokerSettings,
    link: Arc<Mutex<Link>>,
}

impl AmqpEmailPublisher {
    /// Connect and declare the exchange, queue and binding. Fails fast so a
    /// misconfigured broker stops startup.
    pub async fn connect(url: &str, settings: BrokerSettings) -> anyhow::Result<Self> {
        let publisher = Self {
            url: Arc::from(url),
            settings,
            link: Arc::default(),
        };
        publisher.ensure_connected().await?;
        Ok(publisher)
    }

    /// Reopen the channel if needed; fails while the broker is unreachable.
    pub async fn ensure_connected(&self) -> anyhow::Result<()> {
        self.channel().await.map(|_| ())
    }

    /// A connected channel, reopening whatever the broker has closed.
    async fn channel(&self) -> anyhow::Result<Channel> {
        let mut link = self.link.lock().await;
        let plan = reopen_plan(
            link.connection.as_ref().map(|c| c.status().connected()),
            link.channel.as_ref().map(|c| c.status().connected()),
        );

        if plan == Reopen::Connection {
            tracing::info!("opening AMQP connection");
            link.channel = None;
            link.connection = Some(
                Connection::connect(&self.url, ConnectionProperties::default())
                    .await
                    .context("connect to AMQP broker")?,
            );
        }
        if plan != Reopen::Nothing {
            let channel = {
                let connection = link
                    .connection
                    .as_ref()
                    .context("AMQP connection missing")?;
                self.open_channel(connection).await?
            };
            link.channel = Some(channel);
        }

        link.channel.clone().context("AMQP channel missing")
    }

    async fn open_channel(&self, connection: &Connection) -> anyhow::Result<Channel> {
        let channel = connection
            .create_channel()
            .await
            .context("open AMQP channel")?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .context("enable publisher confirms")?;

        channel
            .exchange_declare(
                &self.settings.exchange,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .context("declare email exchange")?;
        channel
            .queue_declare(
                &self.settings.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .context("declare email queue")?;
        channel
            .queue_bind(
                &self.settings.queue,
                &self.settings.exchange,
                &self.settings.binding_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .context("bind email queue")?;

        Ok(channel)
    }
}

impl NotificationPublisher for AmqpEmailPublisher {
    async fn publish(&self, payload: &[u8]) -> Result<(), AuthServiceError> {
        let channel = self.channel().await?;
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(PERSISTENT)
            .with_message_id(Uuid::new_v4().to_string().into())
            .with_timestamp(Utc::now().timestamp().max(0) as u64);

        let confirmation = channel
            .basic_publish(
                &self.settings.exchange,
                &self.settings.binding_key,
                BasicPublishOptions::default(),
                payload,
                properties,
            )
            .await
            .context("publish email notification")?
            .await
            .context("await broker confirm")?;

        if confirmation.is_nack() {
            return Err(anyhow!("broker rejected email notification").into());
        }
        Ok(())
    }
}
