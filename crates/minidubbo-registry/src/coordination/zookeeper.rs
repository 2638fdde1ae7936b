use std::time::Duration;

use zookeeper_client as zk;

use super::NodeMode;
use crate::error::{CoordinationError, Result};

/// A ZooKeeper session.
///
/// The session lives as long as this value (and its inner client); dropping
/// it lets ZooKeeper expire the session and remove its ephemeral nodes.
pub struct ZooKeeperSession {
    client: zk::Client,
}

impl ZooKeeperSession {
    /// Connects to `connect_string`, waiting at most `timeout` for the
    /// session to reach the connected state.
    pub async fn connect(connect_string: &str, timeout: Duration) -> Result<Self> {
        match tokio::time::timeout(timeout, zk::Client::connect(connect_string)).await {
            Ok(Ok(client)) => Ok(Self { client }),
            Ok(Err(e)) => Err(CoordinationError::Connect {
                target: connect_string.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(CoordinationError::ConnectTimeout {
                target: connect_string.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        let stat = self
            .client
            .check_stat(path)
            .await
            .map_err(|e| map_zk_error(e, path))?;
        Ok(stat.is_some())
    }

    pub async fn create(&self, path: &str, data: &[u8], mode: NodeMode) -> Result<String> {
        let create_mode = match mode {
            NodeMode::Persistent => zk::CreateMode::Persistent,
            NodeMode::Ephemeral => zk::CreateMode::Ephemeral,
            NodeMode::EphemeralSequential => zk::CreateMode::EphemeralSequential,
        };
        let options = create_mode.with_acls(zk::Acls::anyone_all());

        let (_stat, sequence) = self
            .client
            .create(path, data, &options)
            .await
            .map_err(|e| map_zk_error(e, path))?;

        Ok(match mode {
            NodeMode::EphemeralSequential => format!("{}{}", path, sequence),
            NodeMode::Persistent | NodeMode::Ephemeral => path.to_string(),
        })
    }

    pub async fn children(&self, path: &str) -> Result<Vec<String>> {
        let mut children = self
            .client
            .list_children(path)
            .await
            .map_err(|e| map_zk_error(e, path))?;
        // ZooKeeper does not order children; sequential suffixes sort by age
        children.sort();
        Ok(children)
    }

    pub async fn data(&self, path: &str) -> Result<Vec<u8>> {
        let (data, _stat) = self
            .client
            .get_data(path)
            .await
            .map_err(|e| map_zk_error(e, path))?;
        Ok(data)
    }
}

fn map_zk_error(err: zk::Error, path: &str) -> CoordinationError {
    match err {
        zk::Error::NoNode => CoordinationError::NoNode(path.to_string()),
        zk::Error::NodeExists => CoordinationError::NodeExists(path.to_string()),
        other => CoordinationError::Backend(format!("{} ({})", other, path)),
    }
}
