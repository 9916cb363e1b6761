//! Industry-based row scoping.
//!
//! Every request resolves the caller into a [`TenantScope`] once. The same
//! scope value then drives both halves of tenant isolation:
//!
//! * collection queries, through [`scoped_query!`](crate::scoped_query), which
//!   turns the scope into a Diesel filter on `industry_id`, `created_by` and
//!   the table's owning-user column;
//! * object checks, through [`TenantScope::permits`], which applies the same
//!   rules to a loaded row via the [`OwnedEntity`] trait.
//!
//! The rules, by caller:
//!
//! | caller                 | visible rows                                              |
//! |------------------------|-----------------------------------------------------------|
//! | Global Admin           | everything                                                |
//! | no industry            | nothing                                                   |
//! | owner                  | rows in the caller's industry                             |
//! | manager                | industry rows created by the manager, their field officers or those officers' farmers |
//! | field officer          | industry rows created by or owned by the officer or their farmers |
//! | farmer                 | industry rows created by or owned by the farmer           |
//! | no / unrecognised role | rows in the caller's industry                             |

use diesel::prelude::*;

use crate::models::{Role, RoleKind, User};
use crate::schema::{roles, users};

/// Implemented by every industry-scoped record.
pub trait OwnedEntity {
    fn industry_id(&self) -> Option<i32>;

    fn created_by(&self) -> Option<i32>;

    /// The user the record belongs to (plot farmer, farm owner, task
    /// assignee), when the type has such a relation.
    fn owning_user(&self) -> Option<i32> {
        None
    }
}

/// The identity facts scoping decisions are made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub industry_id: Option<i32>,
    pub role: Option<RoleKind>,
    pub is_superuser: bool,
}

impl Actor {
    pub fn new(user: &User, role: Option<&Role>) -> Self {
        Actor {
            id: user.id,
            industry_id: user.industry_id,
            role: role.and_then(Role::kind),
            is_superuser: user.is_superuser,
        }
    }

    /// True for a Global Admin or a holder of any listed role.
    pub fn has_any_role(&self, allowed: &[RoleKind]) -> bool {
        self.is_superuser || self.role.is_some_and(|r| allowed.contains(&r))
    }

    /// Industry and creator stamped onto a record this actor creates.
    ///
    /// Non-superusers always stamp their own industry. A Global Admin may
    /// target an industry explicitly and otherwise stamps their own.
    pub fn stamp(&self, requested_industry: Option<i32>) -> RecordStamp {
        let industry_id = if self.is_superuser {
            requested_industry.or(self.industry_id)
        } else {
            self.industry_id
        };
        RecordStamp {
            industry_id,
            created_by: Some(self.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordStamp {
    pub industry_id: Option<i32>,
    pub created_by: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantScope {
    Unrestricted,
    Nothing,
    Industry(i32),
    /// Industry rows whose creator is in `creators`, or whose owning user is
    /// in `owners` when that set is present.
    Hierarchy {
        industry_id: i32,
        creators: Vec<i32>,
        owners: Option<Vec<i32>>,
    },
}

impl TenantScope {
    pub fn resolve(conn: &mut SqliteConnection, actor: &Actor) -> QueryResult<TenantScope> {
        if actor.is_superuser {
            return Ok(TenantScope::Unrestricted);
        }
        let Some(industry_id) = actor.industry_id else {
            return Ok(TenantScope::Nothing);
        };

        let scope = match actor.role {
            Some(RoleKind::Owner) | None => TenantScope::Industry(industry_id),
            Some(RoleKind::Manager) => {
                let officers =
                    subordinates(conn, &[actor.id], RoleKind::FieldOfficer, industry_id)?;
                let farmers = subordinates(conn, &officers, RoleKind::Farmer, industry_id)?;
                let mut creators = vec![actor.id];
                creators.extend(officers);
                creators.extend(farmers);
                TenantScope::Hierarchy {
                    industry_id,
                    creators,
                    owners: None,
                }
            }
            Some(RoleKind::FieldOfficer) => {
                let farmers = subordinates(conn, &[actor.id], RoleKind::Farmer, industry_id)?;
                let mut members = vec![actor.id];
                members.extend(farmers);
                TenantScope::Hierarchy {
                    industry_id,
                    creators: members.clone(),
                    owners: Some(members),
                }
            }
            Some(RoleKind::Farmer) => TenantScope::Hierarchy {
                industry_id,
                creators: vec![actor.id],
                owners: Some(vec![actor.id]),
            },
        };
        Ok(scope)
    }

    /// Object-level check. Agrees row for row with [`scoped_query!`](crate::scoped_query).
    pub fn permits<E: OwnedEntity + ?Sized>(&self, entity: &E) -> bool {
        match self {
            TenantScope::Unrestricted => true,
            TenantScope::Nothing => false,
            TenantScope::Industry(industry_id) => entity.industry_id() == Some(*industry_id),
            TenantScope::Hierarchy {
                industry_id,
                creators,
                owners,
            } => {
                if entity.industry_id() != Some(*industry_id) {
                    return false;
                }
                let created = entity
                    .created_by()
                    .is_some_and(|creator| creators.contains(&creator));
                let owned = match (owners, entity.owning_user()) {
                    (Some(owners), Some(owner)) => owners.contains(&owner),
                    _ => false,
                };
                created || owned
            }
        }
    }
}

/// Builds a boxed query over `$table` restricted to a [`TenantScope`].
///
/// Evaluates to `None` when the scope admits no rows. Pass the owning-user
/// column as a third argument for tables that have one.
///
/// ```ignore
/// let Some(query) = scoped_query!(&scope, plots, farmer_id) else {
///     return Ok(Vec::new());
/// };
/// query.order(plots::id.asc()).load::<Plot>(conn)
/// ```
#[macro_export]
macro_rules! scoped_query {
    ($scope:expr, $table:ident) => {{
        use diesel::prelude::*;
        let query: Option<$table::BoxedQuery<'static, diesel::sqlite::Sqlite>> = match $scope {
            $crate::tenancy::TenantScope::Unrestricted => Some($table::table.into_boxed()),
            $crate::tenancy::TenantScope::Nothing => None,
            $crate::tenancy::TenantScope::Industry(industry_id) => Some(
                $table::table
                    .filter($table::industry_id.eq(*industry_id))
                    .into_boxed(),
            ),
            $crate::tenancy::TenantScope::Hierarchy {
                industry_id,
                creators,
                ..
            } => Some(
                $table::table
                    .filter($table::industry_id.eq(*industry_id))
                    .filter($table::created_by.eq_any(creators.clone()))
                    .into_boxed(),
            ),
        };
        query
    }};
    ($scope:expr, $table:ident, $owner:ident) => {{
        use diesel::prelude::*;
        let query: Option<$table::BoxedQuery<'static, diesel::sqlite::Sqlite>> = match $scope {
            $crate::tenancy::TenantScope::Unrestricted => Some($table::table.into_boxed()),
            $crate::tenancy::TenantScope::Nothing => None,
            $crate::tenancy::TenantScope::Industry(industry_id) => Some(
                $table::table
                    .filter($table::industry_id.eq(*industry_id))
                    .into_boxed(),
            ),
            $crate::tenancy::TenantScope::Hierarchy {
                industry_id,
                creators,
                owners,
            } => {
                let base = $table::table
                    .filter($table::industry_id.eq(*industry_id))
                    .into_boxed();
                Some(match owners {
                    Some(owners) => base.filter(
                        $table::created_by
                            .eq_any(creators.clone())
                            .or($table::$owner.eq_any(owners.clone())),
                    ),
                    None => base.filter($table::created_by.eq_any(creators.clone())),
                })
            }
        };
        query
    }};
}

/// Users with `role` in `industry_id` created by any of `creators`.
pub fn subordinates(
    conn: &mut SqliteConnection,
    creators: &[i32],
    role: RoleKind,
    industry_id: i32,
) -> QueryResult<Vec<i32>> {
    if creators.is_empty() {
        return Ok(Vec::new());
    }
    users::table
        .inner_join(roles::table)
        .filter(users::created_by.eq_any(creators.to_vec()))
        .filter(roles::name.eq(role))
        .filter(users::industry_id.eq(industry_id))
        .select(users::id)
        .order(users::id.asc())
        .load(conn)
}

/// Which users a caller may see and manage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessibleUsers {
    All,
    Only(Vec<i32>),
}

impl AccessibleUsers {
    pub fn resolve(conn: &mut SqliteConnection, actor: &Actor) -> QueryResult<AccessibleUsers> {
        if actor.is_superuser {
            return Ok(AccessibleUsers::All);
        }
        let Some(industry_id) = actor.industry_id else {
            return Ok(AccessibleUsers::Only(Vec::new()));
        };

        let ids = match actor.role {
            Some(RoleKind::Owner) => users::table
                .filter(users::industry_id.eq(industry_id))
                .select(users::id)
                .order(users::id.asc())
                .load(conn)?,
            Some(RoleKind::Manager) => {
                let officers =
                    subordinates(conn, &[actor.id], RoleKind::FieldOfficer, industry_id)?;
                let farmers = subordinates(conn, &officers, RoleKind::Farmer, industry_id)?;
                let mut ids = officers;
                ids.extend(farmers);
                ids
            }
            Some(RoleKind::FieldOfficer) => {
                subordinates(conn, &[actor.id], RoleKind::Farmer, industry_id)?
            }
            Some(RoleKind::Farmer) => vec![actor.id],
            None => Vec::new(),
        };
        Ok(AccessibleUsers::Only(ids))
    }

    pub fn contains(&self, user_id: i32) -> bool {
        match self {
            AccessibleUsers::All => true,
            AccessibleUsers::Only(ids) => ids.contains(&user_id),
        }
    }
}

/// The users `actor` may see, ordered by id.
pub fn get_accessible_users(conn: &mut SqliteConnection, actor: &Actor) -> QueryResult<Vec<User>> {
    match AccessibleUsers::resolve(conn, actor)? {
        AccessibleUsers::All => users::table.order(users::id.asc()).load(conn),
        AccessibleUsers::Only(ids) if ids.is_empty() => Ok(Vec::new()),
        AccessibleUsers::Only(ids) => users::table
            .filter(users::id.eq_any(ids))
            .order(users::id.asc())
            .load(conn),
    }
}

/// Whether `actor` may make `target` the owner of a record: themselves or
/// anyone they can see.
pub fn may_assign_to(conn: &mut SqliteConnection, actor: &Actor, target: i32) -> QueryResult<bool> {
    if target == actor.id {
        return Ok(true);
    }
    Ok(AccessibleUsers::resolve(conn, actor)?.contains(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlotInput, TaskInput, TaskPriority, TaskStatus};
    use crate::orm::plot::{insert_plot, list_plots};
    use crate::orm::task::{insert_task, list_tasks};
    use crate::orm::testing::{TenantFixture, setup_test_db};

    fn plot(gat: &str, farmer_id: Option<i32>) -> PlotInput {
        PlotInput {
            gat_number: gat.to_string(),
            plot_number: String::new(),
            village: String::new(),
            taluka: String::new(),
            district: String::new(),
            state: String::new(),
            country: "India".to_string(),
            pin_code: String::new(),
            latitude: None,
            longitude: None,
            boundary: None,
            farmer_id,
        }
    }

    fn gats(plots: &[crate::models::Plot]) -> Vec<String> {
        let mut gats: Vec<String> = plots.iter().map(|p| p.gat_number.clone()).collect();
        gats.sort();
        gats
    }

    #[test]
    fn superuser_is_unrestricted_and_missing_industry_sees_nothing() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);

        let admin = f.actor(&mut conn, f.superadmin.id);
        assert_eq!(TenantScope::resolve(&mut conn, &admin).unwrap(), TenantScope::Unrestricted);

        let drifter = f.actor(&mut conn, f.drifter.id);
        assert_eq!(TenantScope::resolve(&mut conn, &drifter).unwrap(), TenantScope::Nothing);
    }

    #[test]
    fn owner_sees_exactly_their_industry() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);

        let farmer = f.actor(&mut conn, f.farmer_a1.id);
        let other = f.actor(&mut conn, f.owner_b.id);
        insert_plot(&mut conn, plot("A-1", Some(farmer.id)), farmer.stamp(None)).unwrap();
        insert_plot(&mut conn, plot("B-1", None), other.stamp(None)).unwrap();

        let owner = f.actor(&mut conn, f.owner_a.id);
        let scope = TenantScope::resolve(&mut conn, &owner).unwrap();
        assert_eq!(scope, TenantScope::Industry(f.industry_a.id));
        assert_eq!(gats(&list_plots(&mut conn, &scope).unwrap()), vec!["A-1"]);
    }

    #[test]
    fn manager_sees_only_their_creation_chain() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);

        let farmer_1 = f.actor(&mut conn, f.farmer_a1.id);
        let farmer_2 = f.actor(&mut conn, f.farmer_a2.id);
        insert_plot(&mut conn, plot("chain-1", Some(farmer_1.id)), farmer_1.stamp(None)).unwrap();
        insert_plot(&mut conn, plot("chain-2", Some(farmer_2.id)), farmer_2.stamp(None)).unwrap();

        let manager = f.actor(&mut conn, f.manager_a1.id);
        let scope = TenantScope::resolve(&mut conn, &manager).unwrap();
        match &scope {
            TenantScope::Hierarchy { creators, owners, .. } => {
                assert!(creators.contains(&f.manager_a1.id));
                assert!(creators.contains(&f.fo_a1.id));
                assert!(creators.contains(&f.farmer_a1.id));
                assert!(!creators.contains(&f.fo_a2.id));
                assert!(owners.is_none());
            }
            other => panic!("unexpected scope {:?}", other),
        }
        assert_eq!(gats(&list_plots(&mut conn, &scope).unwrap()), vec!["chain-1"]);
    }

    #[test]
    fn field_officer_sees_records_owned_by_their_farmers() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);

        // Created by the owner, but assigned to a farmer of fo_a1.
        let owner = f.actor(&mut conn, f.owner_a.id);
        let task = TaskInput {
            title: "Spray".to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: TaskPriority::High,
            due_date: None,
            assigned_to: Some(f.farmer_a1.id),
        };
        insert_task(&mut conn, task.clone(), owner.stamp(None)).unwrap();
        insert_task(
            &mut conn,
            TaskInput {
                title: "Prune".to_string(),
                assigned_to: Some(f.farmer_a2.id),
                ..task
            },
            owner.stamp(None),
        )
        .unwrap();

        let officer = f.actor(&mut conn, f.fo_a1.id);
        let scope = TenantScope::resolve(&mut conn, &officer).unwrap();
        let titles: Vec<String> = list_tasks(&mut conn, &scope)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Spray"]);
    }

    #[test]
    fn permits_agrees_with_scoped_query_for_every_caller() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);

        for (gat, creator, farmer) in [
            ("p1", f.farmer_a1.id, Some(f.farmer_a1.id)),
            ("p2", f.fo_a1.id, Some(f.farmer_a1.id)),
            ("p3", f.manager_a2.id, Some(f.farmer_a2.id)),
            ("p4", f.owner_a.id, None),
            ("p5", f.owner_b.id, None),
            ("p6", f.fo_a2.id, Some(f.farmer_a1.id)),
        ] {
            let actor = f.actor(&mut conn, creator);
            insert_plot(&mut conn, plot(gat, farmer), actor.stamp(None)).unwrap();
        }
        let all = list_plots(&mut conn, &TenantScope::Unrestricted).unwrap();
        assert_eq!(all.len(), 6);

        for user in f.everyone() {
            let actor = f.actor(&mut conn, user.id);
            let scope = TenantScope::resolve(&mut conn, &actor).unwrap();
            let listed = gats(&list_plots(&mut conn, &scope).unwrap());
            let permitted: Vec<_> = all.iter().filter(|p| scope.permits(*p)).cloned().collect();
            assert_eq!(listed, gats(&permitted), "scope mismatch for {}", user.username);
        }
    }

    #[test]
    fn accessible_users_follow_the_hierarchy() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);

        let ids = |conn: &mut SqliteConnection, user_id: i32| -> Vec<i32> {
            let actor = f.actor(conn, user_id);
            get_accessible_users(conn, &actor)
                .unwrap()
                .into_iter()
                .map(|u| u.id)
                .collect()
        };

        assert_eq!(ids(&mut conn, f.manager_a1.id), vec![f.fo_a1.id, f.farmer_a1.id, f.inactive.id]);
        assert_eq!(ids(&mut conn, f.fo_a1.id), vec![f.farmer_a1.id, f.inactive.id]);
        assert_eq!(ids(&mut conn, f.farmer_a1.id), vec![f.farmer_a1.id]);
        assert!(ids(&mut conn, f.drifter.id).is_empty());

        let owner_ids = ids(&mut conn, f.owner_b.id);
        assert_eq!(owner_ids, vec![f.owner_b.id, f.manager_b.id]);

        let admin_ids = ids(&mut conn, f.superadmin.id);
        assert_eq!(admin_ids.len(), f.everyone().len());
    }

    #[test]
    fn stamps_follow_the_creator_industry() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);

        let manager = f.actor(&mut conn, f.manager_a1.id);
        assert_eq!(manager.stamp(Some(f.industry_b.id)).industry_id, Some(f.industry_a.id));

        let admin = f.actor(&mut conn, f.superadmin.id);
        assert_eq!(admin.stamp(Some(f.industry_b.id)).industry_id, Some(f.industry_b.id));
        assert_eq!(admin.stamp(None).industry_id, None);
    }

    #[test]
    fn may_assign_within_reach_only() {
        let mut conn = setup_test_db();
        let f = TenantFixture::create(&mut conn);

        let officer = f.actor(&mut conn, f.fo_a1.id);
        assert!(may_assign_to(&mut conn, &officer, f.fo_a1.id).unwrap());
        assert!(may_assign_to(&mut conn, &officer, f.farmer_a1.id).unwrap());
        assert!(!may_assign_to(&mut conn, &officer, f.farmer_a2.id).unwrap());
    }
}
