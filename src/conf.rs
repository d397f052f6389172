//! Defines configuration as read from the environment.

use serde::Deserialize;

/// Default `port` value.
fn default_port() -> u16 {
    8080
}

/// Default `source_base_url` value.
fn default_source_base_url() -> String {
    String::from("https://d37ci6vzurychx.cloudfront.net/trip-data")
}

/// Default `bucket` value.
fn default_bucket() -> String {
    String::from("nyc-taxi-datalake-project")
}

/// Default `key_prefix` value.
fn default_key_prefix() -> String {
    String::from("nyc-taxi-datalake-project/raw")
}

/// Default `default_year` value.
fn default_default_year() -> String {
    String::from("2025")
}

/// Default `default_month` value.
fn default_default_month() -> String {
    String::from("01")
}

/// Default `project_id` value.
fn default_project_id() -> String {
    String::from("gcp-d-461809")
}

/// Default `topic_id` value.
fn default_topic_id() -> String {
    String::from("trigger-nyc-pipeline")
}

/// Default `pubsub_endpoint` value.
fn default_pubsub_endpoint() -> String {
    String::from("https://pubsub.googleapis.com")
}

/// The ingestion handler downloads a monthly file and stores it in a
/// bucket. Every setting has a default, and may be overridden
/// through environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct IngestionSettings {
    /// The port the HTTP surface listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The base URL the monthly files are downloaded from, without a
    /// trailing slash. The file name is appended to it.
    #[serde(default = "default_source_base_url")]
    pub source_base_url: String,

    /// The bucket that receives the downloaded files.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// The object key prefix under which files are stored. The file
    /// name is appended to it after a slash.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// The year used when a message doesn't carry one.
    #[serde(default = "default_default_year")]
    pub default_year: String,

    /// The month used when a message doesn't carry one.
    #[serde(default = "default_default_month")]
    pub default_month: String,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        IngestionSettings {
            port: default_port(),
            source_base_url: default_source_base_url(),
            bucket: default_bucket(),
            key_prefix: default_key_prefix(),
            default_year: default_default_year(),
            default_month: default_default_month(),
        }
    }
}

/// The scheduler publishes a message naming the current month to a
/// topic.
#[derive(Clone, Debug, Deserialize)]
pub struct SchedulerSettings {
    /// The port the HTTP surface listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The project owning the topic.
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// The topic that receives the trigger messages.
    #[serde(default = "default_topic_id")]
    pub topic_id: String,

    /// The base URL of the publishing API. Point it to an emulator
    /// for local runs.
    #[serde(default = "default_pubsub_endpoint")]
    pub pubsub_endpoint: String,

    /// A bearer token attached to publish requests, if any.
    #[serde(default)]
    pub pubsub_access_token: Option<String>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        SchedulerSettings {
            port: default_port(),
            project_id: default_project_id(),
            topic_id: default_topic_id(),
            pubsub_endpoint: default_pubsub_endpoint(),
            pubsub_access_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingestion_defaults_apply_to_missing_variables() {
        let settings: IngestionSettings =
            envy::from_iter(vec![(String::from("BUCKET"), String::from("other"))]).unwrap();
        assert_eq!(settings.bucket, "other");
        assert_eq!(settings.key_prefix, "nyc-taxi-datalake-project/raw");
        assert_eq!(settings.default_year, "2025");
        assert_eq!(settings.default_month, "01");
        assert_eq!(settings.port, 8080);
    }

    #[test]
    fn scheduler_reads_overrides() {
        let settings: SchedulerSettings = envy::from_iter(vec![
            (String::from("PORT"), String::from("9000")),
            (String::from("TOPIC_ID"), String::from("backfill")),
            (String::from("PUBSUB_ACCESS_TOKEN"), String::from("secret")),
        ])
        .unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.project_id, "gcp-d-461809");
        assert_eq!(settings.topic_id, "backfill");
        assert_eq!(settings.pubsub_access_token.as_deref(), Some("secret"));
    }
}
