//! In-memory policy data.

use async_trait::async_trait;
use dashmap::DashMap;

use hallpass_core::result::AppResult;
use hallpass_core::types::{GroupId, LocationId, StudentId};
use hallpass_entity::policy::{Group, LocationRule, Restriction};

use crate::repositories::PolicyRepository;

/// Restrictions, groups and location rules held in process memory.
#[derive(Debug, Default)]
pub struct MemoryPolicyRepository {
    restrictions: DashMap<StudentId, Vec<Restriction>>,
    groups: DashMap<GroupId, Group>,
    rules: DashMap<LocationId, LocationRule>,
    overrides: DashMap<(LocationId, StudentId), LocationRule>,
}

impl MemoryPolicyRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a restriction.
    pub fn add_restriction(&self, restriction: Restriction) {
        self.restrictions
            .entry(restriction.student_id)
            .or_default()
            .push(restriction);
    }

    /// Add or replace a group.
    pub fn upsert_group(&self, group: Group) {
        self.groups.insert(group.id, group);
    }

    /// Add or replace a rule. Rules carrying a student are stored as overrides.
    pub fn set_rule(&self, rule: LocationRule) {
        match rule.student_id {
            Some(student_id) => {
                self.overrides.insert((rule.location_id, student_id), rule);
            }
            None => {
                self.rules.insert(rule.location_id, rule);
            }
        }
    }
}

#[async_trait]
impl PolicyRepository for MemoryPolicyRepository {
    async fn restrictions_for_student(&self, student_id: StudentId) -> AppResult<Vec<Restriction>> {
        Ok(self
            .restrictions
            .get(&student_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn groups_for_student(&self, student_id: StudentId) -> AppResult<Vec<Group>> {
        Ok(self
            .groups
            .iter()
            .filter(|entry| entry.value().contains(student_id))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn location_rule(&self, location_id: LocationId) -> AppResult<Option<LocationRule>> {
        Ok(self.rules.get(&location_id).map(|entry| entry.value().clone()))
    }

    async fn student_override(
        &self,
        location_id: LocationId,
        student_id: StudentId,
    ) -> AppResult<Option<LocationRule>> {
        Ok(self
            .overrides
            .get(&(location_id, student_id))
            .map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hallpass_entity::policy::{GroupType, RuleDecision};
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_rules_split_into_defaults_and_overrides() {
        let repo = MemoryPolicyRepository::new();
        let room = LocationId::new();
        let student = StudentId::new();

        repo.set_rule(LocationRule::location_default(
            room,
            RuleDecision::Allow,
            RuleDecision::Allow,
        ));
        repo.set_rule(LocationRule::student_override(
            room,
            student,
            RuleDecision::Disallow,
            RuleDecision::Allow,
        ));

        let default = repo.location_rule(room).await.unwrap().unwrap();
        assert_eq!(default.student_leave, RuleDecision::Allow);
        let over = repo.student_override(room, student).await.unwrap().unwrap();
        assert_eq!(over.student_leave, RuleDecision::Disallow);
        assert!(repo.student_override(room, StudentId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_groups_filtered_by_membership() {
        let repo = MemoryPolicyRepository::new();
        let member = StudentId::new();
        repo.upsert_group(Group {
            id: GroupId::new(),
            name: "Hall monitors".into(),
            group_type: GroupType::Positive,
            assigned_students: HashSet::from([member]),
        });

        assert_eq!(repo.groups_for_student(member).await.unwrap().len(), 1);
        assert!(repo.groups_for_student(StudentId::new()).await.unwrap().is_empty());
    }
}
