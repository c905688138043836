//! Storage contract shared by every `UserStore` backend
//!
//! Each check expects an empty store.

// Not every test binary runs every check
#![allow(dead_code)]

use roster_core::field::UserField;
use roster_core::pagination::PageRequest;
use roster_core::query::{Direction, Filter, FilterOp, Scalar, Sort, UserQuery};
use roster_core::types::{NewUser, SearchCriteria, User, UserId, UserPatch};
use roster_core::{RosterError, UserStore};
use std::collections::HashSet;

/// Test fixture: insert a user
pub async fn insert(store: &dyn UserStore, name: &str, email: &str, age: Option<i32>) -> User {
    store
        .insert(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            age,
        })
        .await
        .expect("Failed to insert user")
}

fn ids(users: &[User]) -> Vec<i64> {
    users.iter().map(|u| u.id.get()).collect()
}

fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|u| u.name.as_str()).collect()
}

pub async fn ids_are_monotonic(store: &dyn UserStore) {
    let a = insert(store, "Trần An", "a@example.com", Some(20)).await;
    let b = insert(store, "Lê Bình", "b@example.com", Some(21)).await;
    store.delete(b.id).await.unwrap();
    let c = insert(store, "Phạm Châu", "c@example.com", Some(22)).await;

    assert!(a.id < b.id);
    assert!(b.id < c.id, "deleted id must not be reused");
    assert_eq!(a.created_at, a.updated_at);
}

pub async fn cursor_pages_cover_every_row_once(store: &dyn UserStore) {
    let mut expected = Vec::new();
    for i in 0..25 {
        let name = format!("User {i:02}");
        let user = insert(store, &name, &format!("u{i}@example.com"), Some(30)).await;
        expected.push(user.id.get());
    }
    // Gaps must not break paging
    let deleted = [expected[3], expected[10], expected[24]];
    for id in deleted {
        store.delete(UserId::new(id)).await.unwrap();
    }
    expected.retain(|id| !deleted.contains(id));

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = store
            .list_page(PageRequest::new(cursor, Some(7)))
            .await
            .unwrap();
        assert!(page.len() <= 7);
        seen.extend(ids(&page.items));
        match page.next_cursor {
            Some(next) => cursor = Some(next.get()),
            None => break,
        }
    }

    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), seen.len());
    assert_eq!(seen, expected);
}

pub async fn empty_page_has_no_cursor(store: &dyn UserStore) {
    let page = store.list_page(PageRequest::default()).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.next_cursor, None);

    let user = insert(store, "Võ Giang", "giang@example.com", Some(40)).await;
    let page = store.list_page(PageRequest::new(None, Some(1))).await.unwrap();
    assert_eq!(page.next_cursor, Some(user.id));

    let page = store
        .list_page(PageRequest::new(Some(user.id.get()), Some(1)))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.next_cursor, None);
}

pub async fn name_sort_uses_given_name_first(store: &dyn UserStore) {
    insert(store, "Trần Vân Anh", "van@example.com", Some(25)).await;
    insert(store, "Trần Linh Anh", "linh@example.com", Some(30)).await;
    insert(store, "Nguyễn Minh Anh", "minh@example.com", Some(22)).await;

    let query = UserQuery {
        sort: Sort {
            field: UserField::Name,
            direction: Direction::Asc,
        },
        ..UserQuery::default()
    };
    let result = store.query(&query).await.unwrap();
    assert_eq!(
        names(&result),
        vec!["Nguyễn Minh Anh", "Trần Linh Anh", "Trần Vân Anh"]
    );

    let query = UserQuery {
        sort: Sort {
            field: UserField::Name,
            direction: Direction::Desc,
        },
        ..query
    };
    let result = store.query(&query).await.unwrap();
    assert_eq!(
        names(&result),
        vec!["Trần Vân Anh", "Trần Linh Anh", "Nguyễn Minh Anh"]
    );
}

pub async fn age_range_and_nulls(store: &dyn UserStore) {
    let young = insert(store, "Đỗ Hà", "ha@example.com", Some(19)).await;
    let mid = insert(store, "Bùi Hải", "hai@example.com", Some(27)).await;
    let unknown = insert(store, "Ngô Hoa", "hoa@example.com", None).await;
    let old = insert(store, "Hồ Hùng", "hung@example.com", Some(34)).await;
    let oldest = insert(store, "Lý Khoa", "khoa@example.com", Some(60)).await;

    let query = UserQuery {
        filters: vec![
            Filter::new(UserField::Age, FilterOp::Gt(Scalar::Integer(20))),
            Filter::new(UserField::Age, FilterOp::Lt(Scalar::Integer(35))),
        ],
        ..UserQuery::default()
    };
    let result = store.query(&query).await.unwrap();
    assert_eq!(ids(&result), vec![mid.id.get(), old.id.get()]);

    let query = UserQuery {
        sort: Sort {
            field: UserField::Age,
            direction: Direction::Asc,
        },
        ..UserQuery::default()
    };
    let result = store.query(&query).await.unwrap();
    assert_eq!(
        ids(&result),
        vec![
            young.id.get(),
            mid.id.get(),
            old.id.get(),
            oldest.id.get(),
            unknown.id.get()
        ]
    );

    let query = UserQuery {
        sort: Sort {
            field: UserField::Age,
            direction: Direction::Desc,
        },
        limit: 2,
        offset: 1,
        ..UserQuery::default()
    };
    let result = store.query(&query).await.unwrap();
    assert_eq!(ids(&result), vec![oldest.id.get(), old.id.get()]);
}

pub async fn text_filters(store: &dyn UserStore) {
    let a = insert(store, "Phan Thu Lan", "Lan.Phan@Example.com", Some(31)).await;
    insert(store, "Dương Long", "long@example.com", Some(32)).await;
    insert(store, "Mai 100%_real", "mai@example.com", Some(33)).await;

    let by_email = UserQuery {
        filters: vec![Filter::new(
            UserField::Email,
            FilterOp::Equals(Scalar::Text("lan.phan@example.com".to_string())),
        )],
        ..UserQuery::default()
    };
    assert_eq!(ids(&store.query(&by_email).await.unwrap()), vec![a.id.get()]);

    let contains = UserQuery {
        filters: vec![Filter::new(
            UserField::Name,
            FilterOp::Contains("LAN".to_string()),
        )],
        ..UserQuery::default()
    };
    assert_eq!(ids(&store.query(&contains).await.unwrap()), vec![a.id.get()]);

    // Wildcards are literal
    let literal = UserQuery {
        filters: vec![Filter::new(
            UserField::Name,
            FilterOp::Contains("%_".to_string()),
        )],
        ..UserQuery::default()
    };
    assert_eq!(names(&store.query(&literal).await.unwrap()), vec!["Mai 100%_real"]);

    let nothing = UserQuery {
        filters: vec![Filter::new(
            UserField::Name,
            FilterOp::Contains("zzz".to_string()),
        )],
        ..UserQuery::default()
    };
    assert!(store.query(&nothing).await.unwrap().is_empty());
}

pub async fn search_combines_criteria(store: &dyn UserStore) {
    let a = insert(store, "Trần Vân Anh", "vananh@gmail.com", Some(25)).await;
    let b = insert(store, "Trần Linh Anh", "linhanh@yahoo.com", Some(30)).await;
    insert(store, "Lê Minh", "minh@gmail.com", Some(25)).await;

    let by_name = SearchCriteria {
        name: Some("anh".to_string()),
        ..SearchCriteria::default()
    };
    assert_eq!(
        ids(&store.search(&by_name).await.unwrap()),
        vec![a.id.get(), b.id.get()]
    );

    let combined = SearchCriteria {
        name: Some("anh".to_string()),
        age: Some(25),
        ..SearchCriteria::default()
    };
    assert_eq!(ids(&store.search(&combined).await.unwrap()), vec![a.id.get()]);

    let by_email = SearchCriteria {
        email: Some("LINHANH@YAHOO.COM".to_string()),
        ..SearchCriteria::default()
    };
    assert_eq!(ids(&store.search(&by_email).await.unwrap()), vec![b.id.get()]);
}

pub async fn duplicate_emails_are_rejected(store: &dyn UserStore) {
    let a = insert(store, "Trần An", "an@example.com", Some(20)).await;
    let b = insert(store, "Lê Bình", "binh@example.com", Some(21)).await;

    let err = store
        .insert(NewUser {
            name: "Other An".to_string(),
            email: "AN@example.com".to_string(),
            age: Some(30),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::DuplicateEmail(_)));

    assert!(store.email_taken("An@Example.com", None).await.unwrap());
    assert!(!store.email_taken("an@example.com", Some(a.id)).await.unwrap());
    assert!(store.email_taken("an@example.com", Some(b.id)).await.unwrap());

    let err = store
        .update(
            b.id,
            UserPatch {
                email: Some("an@example.com".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::DuplicateEmail(_)));

    // Setting one's own address is fine
    let updated = store
        .update(
            a.id,
            UserPatch {
                email: Some("an@example.com".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.email, "an@example.com");
    assert_eq!(store.count().await.unwrap(), 2);
}

pub async fn update_is_partial(store: &dyn UserStore) {
    let user = insert(store, "Trần Thị An", "thian@example.com", Some(28)).await;

    let updated = store
        .update(
            user.id,
            UserPatch {
                age: Some(29),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.age, Some(29));
    assert_eq!(updated.name, user.name);
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.created_at, user.created_at);
    assert!(updated.updated_at > user.updated_at);

    let touched = store
        .update(user.id, UserPatch::default())
        .await
        .unwrap()
        .unwrap();
    assert!(touched.updated_at > updated.updated_at);

    // The old address is free again after a change
    store
        .update(
            user.id,
            UserPatch {
                email: Some("new@example.com".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(!store.email_taken("thian@example.com", None).await.unwrap());

    let missing = store
        .update(UserId::new(9_999), UserPatch::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

pub async fn delete_returns_last_state(store: &dyn UserStore) {
    let user = insert(store, "Huỳnh Mai", "mai@example.com", Some(44)).await;

    assert!(store.delete(UserId::new(9_999)).await.unwrap().is_none());
    assert_eq!(store.count().await.unwrap(), 1);

    let deleted = store.delete(user.id).await.unwrap().unwrap();
    assert_eq!(deleted, user);
    assert!(store.get(user.id).await.unwrap().is_none());
    assert!(store.delete(user.id).await.unwrap().is_none());

    // The address can be reused once its owner is gone
    insert(store, "Huỳnh Mai", "mai@example.com", Some(44)).await;
}

pub async fn returned_timestamps_work_as_filters(store: &dyn UserStore) {
    insert(store, "Phan Lan", "lan@example.com", Some(33)).await;
    let user = insert(store, "Vũ Long", "long@example.com", Some(41)).await;
    assert_eq!(user.created_at.timestamp_subsec_nanos() % 1_000_000, 0);

    let at = |op: fn(Scalar) -> FilterOp| UserQuery {
        filters: vec![Filter::new(
            UserField::CreatedAt,
            op(Scalar::Timestamp(user.created_at)),
        )],
        limit: 100,
        ..UserQuery::default()
    };

    let equal = store.query(&at(FilterOp::Equals)).await.unwrap();
    assert!(ids(&equal).contains(&user.id.get()));

    let later = store.query(&at(FilterOp::Gt)).await.unwrap();
    assert!(!ids(&later).contains(&user.id.get()));

    let updated = store
        .update(user.id, UserPatch::default())
        .await
        .unwrap()
        .unwrap();
    let query = UserQuery {
        filters: vec![Filter::new(
            UserField::UpdatedAt,
            FilterOp::Equals(Scalar::Timestamp(updated.updated_at)),
        )],
        ..UserQuery::default()
    };
    assert_eq!(ids(&store.query(&query).await.unwrap()), vec![user.id.get()]);
}

pub async fn text_sorts_window_after_ordering(store: &dyn UserStore) {
    let people = [
        ("Trần Linh Bình", "binh@example.com"),
        ("Tạ Ngọc Linh An", "Zed@example.com"),
        ("Trần Vân Ánh", "anh2@example.com"),
        ("Nguyễn Minh Anh", "minh@example.com"),
        ("Trần Thị An", "an@example.com"),
        ("Trần Vân Anh", "Anh1@example.com"),
        ("Trần Linh Anh", "linh@example.com"),
    ];
    for (name, email) in people {
        insert(store, name, email, Some(30)).await;
    }

    let by_name = UserQuery {
        sort: Sort {
            field: UserField::Name,
            direction: Direction::Asc,
        },
        limit: 3,
        offset: 2,
        ..UserQuery::default()
    };
    let result = store.query(&by_name).await.unwrap();
    assert_eq!(
        names(&result),
        vec!["Nguyễn Minh Anh", "Trần Linh Anh", "Trần Vân Ánh"]
    );

    // Base-level ties keep ascending id order
    let tie = UserQuery {
        limit: 2,
        offset: 4,
        ..by_name
    };
    let result = store.query(&tie).await.unwrap();
    assert_eq!(names(&result), vec!["Trần Vân Ánh", "Trần Vân Anh"]);

    let by_email = UserQuery {
        sort: Sort {
            field: UserField::Email,
            direction: Direction::Desc,
        },
        limit: 2,
        ..UserQuery::default()
    };
    let result = store.query(&by_email).await.unwrap();
    let emails: Vec<&str> = result.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["Zed@example.com", "minh@example.com"]);
}
