use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wikidyn_core::{Revision, UserContribution};

/// One editor's footprint on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAlter {
    pub count: u64,
    pub first_timestamp: DateTime<Utc>,
    pub last_timestamp: DateTime<Utc>,
}

/// One page's share of an editor's contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAlter {
    pub count: u64,
    pub first_timestamp: DateTime<Utc>,
    pub last_timestamp: DateTime<Utc>,
    pub namespace: i64,
}

/// Editors of a page keyed by editor name.
pub fn page_alters(revisions: &[Revision]) -> BTreeMap<String, PageAlter> {
    let mut alters: BTreeMap<String, PageAlter> = BTreeMap::new();
    for revision in revisions {
        alters
            .entry(revision.editor_name().to_owned())
            .and_modify(|alter| {
                alter.count += 1;
                alter.first_timestamp = alter.first_timestamp.min(revision.timestamp);
                alter.last_timestamp = alter.last_timestamp.max(revision.timestamp);
            })
            .or_insert(PageAlter {
                count: 1,
                first_timestamp: revision.timestamp,
                last_timestamp: revision.timestamp,
            });
    }
    alters
}

/// Pages an editor touched keyed by title.
pub fn user_alters(contributions: &[UserContribution]) -> BTreeMap<String, UserAlter> {
    let mut alters: BTreeMap<String, UserAlter> = BTreeMap::new();
    for contribution in contributions {
        alters
            .entry(contribution.title.clone())
            .and_modify(|alter| {
                alter.count += 1;
                alter.first_timestamp = alter.first_timestamp.min(contribution.timestamp);
                alter.last_timestamp = alter.last_timestamp.max(contribution.timestamp);
            })
            .or_insert(UserAlter {
                count: 1,
                first_timestamp: contribution.timestamp,
                last_timestamp: contribution.timestamp,
                namespace: contribution.namespace,
            });
    }
    alters
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use wikidyn_core::{NoLinks, RawRevision};

    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 4, day, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn page_alters_track_count_and_span_per_editor() {
        let revisions: Vec<Revision> = [("u1", 3), ("u2", 2), ("u1", 1)]
            .into_iter()
            .map(|(user, day)| {
                Revision::from_raw(
                    RawRevision {
                        page_id: Some(1),
                        title: Some("X".to_owned()),
                        user: Some(user.to_owned()),
                        timestamp: Some(at(day).to_rfc3339()),
                        ..RawRevision::default()
                    },
                    &NoLinks,
                )
                .expect("valid revision")
            })
            .collect();

        let alters = page_alters(&revisions);
        assert_eq!(
            alters["u1"],
            PageAlter {
                count: 2,
                first_timestamp: at(1),
                last_timestamp: at(3),
            }
        );
        assert_eq!(alters["u2"].count, 1);
    }

    #[test]
    fn user_alters_keep_the_page_namespace() {
        let contribution = |title: &str, day: u32, namespace: i64| UserContribution {
            title: title.to_owned(),
            timestamp: at(day),
            size_diff: 0,
            namespace,
            revision_id: None,
        };
        let alters = user_alters(&[
            contribution("Talk:X", 1, 1),
            contribution("X", 2, 0),
            contribution("Talk:X", 5, 1),
        ]);

        assert_eq!(alters.len(), 2);
        assert_eq!(alters["Talk:X"].count, 2);
        assert_eq!(alters["Talk:X"].namespace, 1);
        assert_eq!(alters["Talk:X"].last_timestamp, at(5));
    }
}
