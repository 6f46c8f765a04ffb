//! JSON form of the ground truth.
//!
//! ```json
//! [
//!   { "link": [1, 2], "delay": 5.1, "loss": 3.0,
//!     "delay_list": [5.0, 5.1], "loss_list": [3.0, 3.0] }
//! ]
//! ```

use nettomo_core::{
    link::LinkId,
    node::NodeId,
    truth::{GroundTruth, LinkTruth},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTruthJson {
    /// the two end nodes of the link, in any order
    pub link: [u64; 2],
    /// representative delay, in milliseconds
    pub delay: f64,
    /// representative loss, in percent
    pub loss: f64,
    pub delay_list: Vec<f64>,
    pub loss_list: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum TruthJsonError {
    #[error("invalid ground truth")]
    Json(#[from] serde_json::Error),
    #[error("link {0} is described more than once")]
    DuplicateLink(LinkId),
    #[error("link {0}-{0} is a self loop")]
    SelfLoop(u64),
}

impl From<LinkTruthJson> for (LinkId, LinkTruth) {
    fn from(json: LinkTruthJson) -> Self {
        let [a, b] = json.link;
        (
            LinkId::new((NodeId::new(a), NodeId::new(b))),
            LinkTruth {
                delay: json.delay,
                loss: json.loss,
                delay_list: json.delay_list,
                loss_list: json.loss_list,
            },
        )
    }
}

impl From<(LinkId, &LinkTruth)> for LinkTruthJson {
    fn from((link, truth): (LinkId, &LinkTruth)) -> Self {
        let (a, b) = link.into_nodes();
        Self {
            link: [a.into_u64(), b.into_u64()],
            delay: truth.delay,
            loss: truth.loss,
            delay_list: truth.delay_list.clone(),
            loss_list: truth.loss_list.clone(),
        }
    }
}

pub fn parse_truth(content: &str) -> Result<GroundTruth, TruthJsonError> {
    let entries: Vec<LinkTruthJson> = serde_json::from_str(content)?;

    let mut truth = GroundTruth::new();
    for entry in entries {
        if entry.link[0] == entry.link[1] {
            return Err(TruthJsonError::SelfLoop(entry.link[0]));
        }
        let (link, link_truth) = entry.into();
        if truth.insert(link, link_truth).is_some() {
            return Err(TruthJsonError::DuplicateLink(link));
        }
    }
    Ok(truth)
}

pub fn to_json(truth: &GroundTruth) -> Result<String, TruthJsonError> {
    let entries: Vec<LinkTruthJson> = truth.iter().map(LinkTruthJson::from).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRUTH: &str = r#"[
        { "link": [2, 1], "delay": 5.0, "loss": 2.0,
          "delay_list": [5.0, 5.0], "loss_list": [1.0, 3.0] },
        { "link": [2, 3], "delay": 7.0, "loss": 0.0,
          "delay_list": [7.0], "loss_list": [0.0] }
    ]"#;

    fn link(a: u64, b: u64) -> LinkId {
        LinkId::new((NodeId::new(a), NodeId::new(b)))
    }

    #[test]
    fn parse() {
        let truth = parse_truth(TRUTH).unwrap();

        assert_eq!(truth.len(), 2);
        let first = truth.get(link(1, 2)).unwrap();
        assert_eq!(first.loss_list, vec![1.0, 3.0]);
        assert_eq!(truth.get(link(3, 2)).unwrap().delay, 7.0);
    }

    #[test]
    fn write_then_read() {
        let truth = parse_truth(TRUTH).unwrap();
        let json = to_json(&truth).unwrap();

        assert_eq!(parse_truth(&json).unwrap(), truth);
    }

    #[test]
    fn duplicate_link() {
        let json = r#"[
            { "link": [1, 2], "delay": 1.0, "loss": 0.0, "delay_list": [], "loss_list": [] },
            { "link": [2, 1], "delay": 1.0, "loss": 0.0, "delay_list": [], "loss_list": [] }
        ]"#;

        assert!(matches!(
            parse_truth(json),
            Err(TruthJsonError::DuplicateLink(l)) if l == link(1, 2)
        ));
    }

    #[test]
    fn self_loop() {
        let json =
            r#"[{ "link": [4, 4], "delay": 1.0, "loss": 0.0, "delay_list": [], "loss_list": [] }]"#;

        assert!(matches!(parse_truth(json), Err(TruthJsonError::SelfLoop(4))));
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            parse_truth("{ \"link\": 1 }"),
            Err(TruthJsonError::Json(_))
        ));
    }
}
