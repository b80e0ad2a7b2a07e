//! Window groups.
//!
//! A group is a named, ordered set of windows with one active member. Groups
//! collapse (minimizing every member) and expand together. An empty group is
//! deleted the moment its last member leaves.
//!
//! Membership is written on both sides: the group's member list here, and each
//! window's `group_id` through [`WindowStateStore::set_group`].

use std::collections::BTreeMap;

use thiserror::Error;

use super::events::{DesktopEvent, EventBus};
use super::store::WindowStateStore;
use super::types::{GroupId, InvariantViolation, WindowGroup, WindowId, WindowIdList};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("a group needs at least one open window")]
    NoWindows,
}

/// Owns every window group.
pub struct GroupManager {
    groups: BTreeMap<GroupId, WindowGroup>,

    /// Display order handed to the next group.
    next_order: u32,

    events: EventBus,
}

impl GroupManager {
    #[must_use]
    pub const fn new(events: EventBus) -> Self { Self { groups: BTreeMap::new(), next_order: 0, events } }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn get_group(&self, id: GroupId) -> Option<WindowGroup> { self.groups.get(&id).cloned() }

    /// Groups in creation order.
    #[must_use]
    pub fn groups(&self) -> Vec<WindowGroup> {
        let mut groups: Vec<WindowGroup> = self.groups.values().cloned().collect();
        groups.sort_by_key(|g| g.order);
        groups
    }

    /// Finds a group by name (first in creation order).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<GroupId> {
        self.groups().into_iter().find(|g| g.name == name).map(|g| g.id)
    }

    /// The group listing `window_id` as a member.
    #[must_use]
    pub fn group_for_window(&self, window_id: WindowId) -> Option<GroupId> {
        self.groups.values().find(|g| g.contains(window_id)).map(|g| g.id)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.groups.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.groups.is_empty() }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Creates a group from the open windows in `window_ids`.
    ///
    /// Unknown ids are skipped and duplicates collapsed. Windows already in
    /// another group move to the new one. The first member becomes active.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::NoWindows` when no listed window is open.
    pub fn create_group(
        &mut self,
        name: &str,
        window_ids: &[WindowId],
        store: &mut WindowStateStore,
    ) -> Result<GroupId, GroupError> {
        let mut members = WindowIdList::new();
        for &id in window_ids {
            if !store.contains(id) {
                tracing::debug!(window_id = %id, "desktop: skipping unknown window for group");
                continue;
            }
            if !members.contains(&id) {
                members.push(id);
            }
        }
        let Some(&active) = members.first() else {
            return Err(GroupError::NoWindows);
        };

        for &id in &members {
            if let Some(previous) = self.group_for_window(id) {
                self.forget_window(id, previous);
            }
        }

        let group = WindowGroup {
            id: GroupId::new(),
            name: name.to_string(),
            window_ids: members,
            active_window_id: active,
            collapsed: false,
            order: self.next_order,
        };
        self.next_order += 1;

        let id = group.id;
        for &member in &group.window_ids {
            store.set_group(member, Some(id));
        }
        tracing::debug!(group_id = %id, name, members = group.len(), "desktop: group created");
        self.groups.insert(id, group);
        self.emit(id);
        Ok(id)
    }

    /// Adds a window to a group, leaving its previous group.
    ///
    /// The window becomes the active member. Joining a collapsed group
    /// minimizes it.
    pub fn add_window_to_group(
        &mut self,
        window_id: WindowId,
        group_id: GroupId,
        store: &mut WindowStateStore,
    ) -> bool {
        if !store.contains(window_id) || !self.groups.contains_key(&group_id) {
            return false;
        }
        match self.group_for_window(window_id) {
            Some(current) if current == group_id => {
                if let Some(group) = self.groups.get_mut(&group_id) {
                    group.active_window_id = window_id;
                }
                self.emit(group_id);
                return true;
            }
            Some(current) => self.forget_window(window_id, current),
            None => {}
        }

        let Some(group) = self.groups.get_mut(&group_id) else {
            return false;
        };
        group.window_ids.push(window_id);
        group.active_window_id = window_id;
        let collapsed = group.collapsed;

        store.set_group(window_id, Some(group_id));
        if collapsed {
            store.set_minimized(window_id);
        }
        self.emit(group_id);
        true
    }

    /// Removes a window from its group. The window itself stays open.
    pub fn remove_window_from_group(&mut self, window_id: WindowId, store: &mut WindowStateStore) -> bool {
        let Some(group_id) = self.group_for_window(window_id) else {
            return false;
        };
        self.forget_window(window_id, group_id);
        store.set_group(window_id, None);
        true
    }

    /// Drops a window from a group's member list, deleting the group if it
    /// empties. The store calls this when the window closes.
    pub(crate) fn forget_window(&mut self, window_id: WindowId, group_id: GroupId) {
        let Some(group) = self.groups.get_mut(&group_id) else {
            return;
        };
        group.window_ids.retain(|id| *id != window_id);

        if group.is_empty() {
            self.groups.remove(&group_id);
            tracing::debug!(group_id = %group_id, "desktop: empty group deleted");
            self.events.emit(DesktopEvent::GroupChanged { group_id, group: None });
            return;
        }
        if group.active_window_id == window_id {
            group.active_window_id = group.window_ids[0];
        }
        self.emit(group_id);
    }

    // ========================================================================
    // Group Actions
    // ========================================================================

    /// Makes `window_id` the active member and focuses it, expanding the
    /// group if it is collapsed.
    pub fn set_active_window_in_group(
        &mut self,
        group_id: GroupId,
        window_id: WindowId,
        store: &mut WindowStateStore,
    ) -> bool {
        let Some(group) = self.groups.get_mut(&group_id) else {
            return false;
        };
        if !group.contains(window_id) {
            return false;
        }
        group.active_window_id = window_id;

        if group.collapsed {
            return self.expand_group(group_id, store);
        }
        self.emit(group_id);
        store.focus(window_id)
    }

    /// Minimizes every member.
    pub fn collapse_group(&mut self, group_id: GroupId, store: &mut WindowStateStore) -> bool {
        let Some(group) = self.groups.get_mut(&group_id) else {
            return false;
        };
        if group.collapsed {
            return true;
        }
        group.collapsed = true;
        let members = group.window_ids.clone();

        for id in members {
            store.set_minimized(id);
        }
        self.emit(group_id);
        true
    }

    /// Restores every member and focuses the active one.
    pub fn expand_group(&mut self, group_id: GroupId, store: &mut WindowStateStore) -> bool {
        let Some(group) = self.groups.get_mut(&group_id) else {
            return false;
        };
        group.collapsed = false;
        let members = group.window_ids.clone();
        let active = group.active_window_id;

        for id in members.into_iter().filter(|id| *id != active) {
            if store.window(id).is_some_and(super::types::Window::is_minimized) {
                store.focus(id);
            }
        }
        store.focus(active);
        self.emit(group_id);
        true
    }

    /// Closes the group and every member window.
    pub fn close_group(&mut self, group_id: GroupId, store: &mut WindowStateStore) -> bool {
        let Some(group) = self.groups.remove(&group_id) else {
            return false;
        };
        self.events.emit(DesktopEvent::GroupChanged { group_id, group: None });
        for id in group.window_ids {
            store.close(id, self);
        }
        tracing::debug!(group_id = %group_id, "desktop: group closed");
        true
    }

    // ========================================================================
    // Consistency
    // ========================================================================

    /// Repairs drift between member lists and window back-references.
    ///
    /// Member lists win: closed windows and members claimed by an earlier
    /// group are dropped, empty groups deleted, and every remaining window's
    /// `group_id` rewritten to match. Returns the number of repairs.
    pub fn heal(&mut self, store: &mut WindowStateStore) -> usize {
        let mut repairs = 0;
        let mut claimed: Vec<WindowId> = Vec::new();

        let order: Vec<GroupId> = self.groups().iter().map(|g| g.id).collect();

        for group_id in order {
            let Some(group) = self.groups.get_mut(&group_id) else {
                continue;
            };
            let before = group.len();
            group.window_ids.retain(|id| store.contains(*id) && !claimed.contains(id));
            let mut seen = WindowIdList::new();
            group.window_ids.retain(|id| {
                if seen.contains(id) {
                    false
                } else {
                    seen.push(*id);
                    true
                }
            });
            repairs += before - group.len();
            claimed.extend(group.window_ids.iter().copied());

            if group.is_empty() {
                self.groups.remove(&group_id);
                self.events.emit(DesktopEvent::GroupChanged { group_id, group: None });
                repairs += 1;
                continue;
            }
            if !group.contains(group.active_window_id) {
                group.active_window_id = group.window_ids[0];
                repairs += 1;
            }
            for id in group.window_ids.clone() {
                if store.window(id).and_then(|w| w.group_id) != Some(group_id) {
                    store.set_group(id, Some(group_id));
                    repairs += 1;
                }
            }
        }

        let dangling: Vec<WindowId> = store
            .windows()
            .filter(|w| w.group_id.is_some() && !claimed.contains(&w.id))
            .map(|w| w.id)
            .collect();
        for id in dangling {
            store.set_group(id, None);
            repairs += 1;
        }

        if repairs > 0 {
            tracing::warn!(repairs, "desktop: repaired group membership");
        }
        repairs
    }

    /// Checks group membership and non-emptiness.
    #[must_use]
    pub fn check_invariants(&self, store: &WindowStateStore) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for group in self.groups.values() {
            if group.is_empty() {
                violations.push(InvariantViolation::EmptyGroup { group_id: group.id });
            }
            for &window_id in &group.window_ids {
                if store.window(window_id).and_then(|w| w.group_id) != Some(group.id) {
                    violations.push(InvariantViolation::MissingBackReference {
                        group_id: group.id,
                        window_id,
                    });
                }
            }
        }

        for window in store.windows() {
            if let Some(group_id) = window.group_id
                && !self.groups.get(&group_id).is_some_and(|g| g.contains(window.id))
            {
                violations.push(InvariantViolation::DanglingGroupReference {
                    window_id: window.id,
                    group_id,
                });
            }
        }

        violations
    }

    fn emit(&self, group_id: GroupId) {
        let group = self.groups.get(&group_id).cloned();
        self.events.emit(DesktopEvent::GroupChanged { group_id, group });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{MonitorsConfig, WindowsConfig};
    use crate::desktop::monitor::MonitorRegistry;
    use crate::desktop::registry::StaticAppRegistry;
    use crate::desktop::store::OpenArgs;
    use crate::desktop::types::{ComponentId, LifecycleState};

    struct Fixture {
        store: WindowStateStore,
        groups: GroupManager,
        monitors: MonitorRegistry,
        apps: StaticAppRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let events = EventBus::new(64);
            Self {
                store: WindowStateStore::new(&WindowsConfig::default(), events.clone()),
                groups: GroupManager::new(events.clone()),
                monitors: MonitorRegistry::new(&MonitorsConfig::default(), events),
                apps: StaticAppRegistry::with_defaults(),
            }
        }

        fn open(&mut self, component: &str) -> WindowId {
            self.store
                .open(&ComponentId::from(component), OpenArgs::default(), &self.apps, &self.monitors)
                .unwrap()
        }

        fn assert_consistent(&self) {
            assert_eq!(self.groups.check_invariants(&self.store), Vec::new());
        }
    }

    mod membership_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_create_group_sets_back_references() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("files");
            let id = f.groups.create_group("Work", &[a, b, a], &mut f.store).unwrap();

            let group = f.groups.get_group(id).unwrap();
            assert_eq!(group.window_ids.as_slice(), &[a, b]);
            assert_eq!(group.active_window_id, a);
            assert_eq!(f.store.window(a).unwrap().group_id, Some(id));
            f.assert_consistent();
        }

        #[test]
        fn test_create_group_without_open_windows_fails() {
            let mut f = Fixture::new();
            let result = f.groups.create_group("Empty", &[WindowId(9)], &mut f.store);
            assert_eq!(result, Err(GroupError::NoWindows));
            assert!(f.groups.is_empty());
        }

        #[test]
        fn test_create_group_steals_members() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("files");
            let first = f.groups.create_group("One", &[a, b], &mut f.store).unwrap();
            let second = f.groups.create_group("Two", &[b], &mut f.store).unwrap();

            assert_eq!(f.groups.get_group(first).unwrap().window_ids.as_slice(), &[a]);
            assert_eq!(f.store.window(b).unwrap().group_id, Some(second));
            f.assert_consistent();
        }

        #[test]
        fn test_moving_last_member_deletes_old_group() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("files");
            let first = f.groups.create_group("One", &[a], &mut f.store).unwrap();
            let second = f.groups.create_group("Two", &[b], &mut f.store).unwrap();

            assert!(f.groups.add_window_to_group(a, second, &mut f.store));
            assert!(f.groups.get_group(first).is_none());
            assert_eq!(f.groups.get_group(second).unwrap().active_window_id, a);
            f.assert_consistent();
        }

        #[test]
        fn test_remove_last_member_deletes_group() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let id = f.groups.create_group("Solo", &[a], &mut f.store).unwrap();

            assert!(f.groups.remove_window_from_group(a, &mut f.store));
            assert!(f.groups.get_group(id).is_none());
            assert_eq!(f.store.window(a).unwrap().group_id, None);
            assert!(!f.groups.remove_window_from_group(a, &mut f.store));
        }

        #[test]
        fn test_closing_member_updates_group() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("files");
            let id = f.groups.create_group("Pair", &[a, b], &mut f.store).unwrap();

            f.store.close(a, &mut f.groups);
            let group = f.groups.get_group(id).unwrap();
            assert_eq!(group.window_ids.as_slice(), &[b]);
            assert_eq!(group.active_window_id, b);

            f.store.close(b, &mut f.groups);
            assert!(f.groups.get_group(id).is_none());
        }

        #[test]
        fn test_find_by_name() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let id = f.groups.create_group("Work", &[a], &mut f.store).unwrap();
            assert_eq!(f.groups.find_by_name("Work"), Some(id));
            assert_eq!(f.groups.find_by_name("Play"), None);
        }
    }

    mod action_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_collapse_and_expand() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("calculator");
            let id = f.groups.create_group("Pair", &[a, b], &mut f.store).unwrap();

            assert!(f.groups.collapse_group(id, &mut f.store));
            assert!(f.store.windows().all(|w| w.lifecycle == LifecycleState::Minimized));
            assert_eq!(f.store.focused_window_id(), None);

            assert!(f.groups.expand_group(id, &mut f.store));
            assert!(f.store.windows().all(|w| w.lifecycle == LifecycleState::Normal));
            assert_eq!(f.store.focused_window_id(), Some(a));
            assert_eq!(f.store.topmost_visible(), Some(a));
        }

        #[test]
        fn test_joining_collapsed_group_minimizes() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("files");
            let id = f.groups.create_group("One", &[a], &mut f.store).unwrap();
            f.groups.collapse_group(id, &mut f.store);

            assert!(f.groups.add_window_to_group(b, id, &mut f.store));
            assert!(f.store.window(b).unwrap().is_minimized());
        }

        #[test]
        fn test_set_active_focuses_member() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("files");
            let id = f.groups.create_group("Pair", &[a, b], &mut f.store).unwrap();

            assert!(f.groups.set_active_window_in_group(id, b, &mut f.store));
            assert_eq!(f.store.focused_window_id(), Some(b));
            assert_eq!(f.groups.get_group(id).unwrap().active_window_id, b);

            let c = f.open("ipod");
            assert!(!f.groups.set_active_window_in_group(id, c, &mut f.store));
        }

        #[test]
        fn test_set_active_expands_collapsed_group() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("files");
            let id = f.groups.create_group("Pair", &[a, b], &mut f.store).unwrap();
            f.groups.collapse_group(id, &mut f.store);

            assert!(f.groups.set_active_window_in_group(id, b, &mut f.store));
            assert!(!f.groups.get_group(id).unwrap().collapsed);
            assert_eq!(f.store.focused_window_id(), Some(b));
        }

        #[test]
        fn test_close_group_closes_members() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let b = f.open("files");
            let c = f.open("calculator");
            let id = f.groups.create_group("Pair", &[a, b], &mut f.store).unwrap();

            assert!(f.groups.close_group(id, &mut f.store));
            assert!(f.groups.is_empty());
            assert_eq!(f.store.len(), 1);
            assert_eq!(f.store.focused_window_id(), Some(c));
            assert!(!f.groups.close_group(id, &mut f.store));
        }
    }

    mod heal_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_heal_clears_dangling_reference() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            f.store.set_group(a, Some(GroupId::new()));
            assert_eq!(f.groups.check_invariants(&f.store).len(), 1);

            assert_eq!(f.groups.heal(&mut f.store), 1);
            f.assert_consistent();
        }

        #[test]
        fn test_heal_restores_missing_back_reference() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            let id = f.groups.create_group("Work", &[a], &mut f.store).unwrap();
            f.store.set_group(a, None);

            assert_eq!(f.groups.heal(&mut f.store), 1);
            assert_eq!(f.store.window(a).unwrap().group_id, Some(id));
        }

        #[test]
        fn test_heal_on_consistent_state_is_noop() {
            let mut f = Fixture::new();
            let a = f.open("notepad");
            f.groups.create_group("Work", &[a], &mut f.store).unwrap();
            assert_eq!(f.groups.heal(&mut f.store), 0);
        }
    }
}
