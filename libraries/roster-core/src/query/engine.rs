//! In-memory query pipeline: filter, sort, slice
//!
//! The PostgreSQL backend reuses [`sort_users`] and [`window`] for text
//! sorts, so both backends order rows the same way.

use super::{Direction, Filter, Sort, UserQuery};
use crate::collation::SortKey;
use crate::types::User;

/// Check a user against every filter
pub fn matches(filters: &[Filter], user: &User) -> bool {
    filters.iter().all(|filter| filter.matches(user))
}

/// Stable sort; rows with equal keys keep their incoming order
pub fn sort_users(users: Vec<User>, sort: Sort) -> Vec<User> {
    let mut keyed: Vec<(SortKey, User)> = users
        .into_iter()
        .map(|user| (SortKey::for_field(sort.field, &user), user))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match sort.direction {
        Direction::Asc => a.compare(b),
        Direction::Desc => b.compare(a),
    });

    keyed.into_iter().map(|(_, user)| user).collect()
}

/// Skip `offset` rows and keep at most `limit`
pub fn window<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}

/// Run a query over a set of users
pub fn run(users: impl IntoIterator<Item = User>, query: &UserQuery) -> Vec<User> {
    let mut matched: Vec<User> = users
        .into_iter()
        .filter(|user| matches(&query.filters, user))
        .collect();
    matched.sort_by_key(|user| user.id);

    let sorted = sort_users(matched, query.sort);
    window(sorted, query.offset, query.limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::UserField;
    use crate::query::{FilterOp, Scalar};
    use crate::types::UserId;
    use chrono::Utc;

    fn users() -> Vec<User> {
        let now = Utc::now();
        [
            (1, "Trần Vân Anh", Some(25)),
            (2, "Trần Linh Anh", Some(40)),
            (3, "Nguyễn Minh Anh", None),
            (4, "Lê Văn Bình", Some(31)),
            (5, "Phạm Thu Bình", Some(25)),
        ]
        .into_iter()
        .map(|(id, name, age)| User {
            id: UserId::new(id),
            name: name.to_string(),
            email: format!("user{id}@example.com"),
            age,
            created_at: now,
            updated_at: now,
        })
        .collect()
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.name.as_str()).collect()
    }

    fn ids(users: &[User]) -> Vec<i64> {
        users.iter().map(|u| u.id.get()).collect()
    }

    #[test]
    fn test_name_sort_uses_vietnamese_order() {
        let query = UserQuery {
            sort: Sort {
                field: UserField::Name,
                direction: Direction::Asc,
            },
            ..UserQuery::default()
        };
        let result = run(users(), &query);
        assert_eq!(
            names(&result),
            vec![
                "Nguyễn Minh Anh",
                "Trần Linh Anh",
                "Trần Vân Anh",
                "Lê Văn Bình",
                "Phạm Thu Bình",
            ]
        );
    }

    #[test]
    fn test_age_range_filter() {
        let query = UserQuery {
            filters: vec![
                Filter::new(UserField::Age, FilterOp::Gt(Scalar::Integer(20))),
                Filter::new(UserField::Age, FilterOp::Lt(Scalar::Integer(35))),
            ],
            ..UserQuery::default()
        };
        let result = run(users(), &query);
        assert_eq!(ids(&result), vec![1, 4, 5]);
    }

    #[test]
    fn test_sort_is_stable_and_nulls_go_last() {
        let asc = UserQuery {
            sort: Sort {
                field: UserField::Age,
                direction: Direction::Asc,
            },
            ..UserQuery::default()
        };
        assert_eq!(ids(&run(users(), &asc)), vec![1, 5, 4, 2, 3]);

        let desc = UserQuery {
            sort: Sort {
                field: UserField::Age,
                direction: Direction::Desc,
            },
            ..UserQuery::default()
        };
        assert_eq!(ids(&run(users(), &desc)), vec![3, 2, 4, 1, 5]);
    }

    #[test]
    fn test_offset_and_limit() {
        let query = UserQuery {
            limit: 2,
            offset: 1,
            ..UserQuery::default()
        };
        assert_eq!(ids(&run(users(), &query)), vec![2, 3]);

        let query = UserQuery {
            offset: 50,
            ..UserQuery::default()
        };
        assert!(run(users(), &query).is_empty());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut shuffled = users();
        shuffled.reverse();
        assert_eq!(ids(&run(shuffled, &UserQuery::default())), vec![1, 2, 3, 4, 5]);
    }
}
