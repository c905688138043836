//! Bulk seeding with synthetic users
//!
//! Rows are generated in batches and inserted with multi-row `INSERT`
//! statements inside a single transaction, so a failed run leaves the
//! table untouched.

use crate::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use roster_core::collation::{name_sort_key, text_sort_key};
use roster_core::types::NewUser;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Default number of rows inserted per statement
pub const DEFAULT_BATCH_SIZE: usize = 500;

// Bind parameters per row; PostgreSQL allows at most 65535 per statement
const PARAMS_PER_ROW: usize = 5;
const MAX_BATCH_SIZE: usize = u16::MAX as usize / PARAMS_PER_ROW;

const FAMILY_NAMES: &[&str] = &[
    "Nguyễn", "Trần", "Lê", "Phạm", "Hoàng", "Huỳnh", "Phan", "Vũ", "Võ", "Đặng", "Bùi", "Đỗ",
    "Hồ", "Ngô", "Dương", "Lý", "Tạ",
];

const MIDDLE_NAMES: &[&str] = &[
    "Văn", "Thị", "Minh", "Ngọc", "Thu", "Linh", "Vân", "Hữu", "Đức", "Thanh", "Quốc", "Gia",
];

const GIVEN_NAMES: &[&str] = &[
    "An", "Anh", "Ánh", "Bình", "Châu", "Dũng", "Giang", "Hà", "Hải", "Hoa", "Hùng", "Khoa",
    "Lan", "Long", "Mai", "Nam", "Phúc", "Quân", "Sơn", "Tâm", "Trang", "Tuấn", "Vy", "Yến",
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "hotmail.com", "example.com"];

/// Generate one synthetic user with a guaranteed-unique e-mail
pub fn random_user<R: Rng + ?Sized>(rng: &mut R) -> NewUser {
    let family = FAMILY_NAMES.choose(rng).copied().unwrap_or("Nguyễn");
    let middle = MIDDLE_NAMES.choose(rng).copied().unwrap_or("Văn");
    let given = GIVEN_NAMES.choose(rng).copied().unwrap_or("An");
    let domain = EMAIL_DOMAINS.choose(rng).copied().unwrap_or("example.com");

    let tag = uuid::Uuid::new_v4().simple().to_string();
    NewUser {
        name: format!("{family} {middle} {given}"),
        email: format!("user.{}@{domain}", &tag[..12]),
        age: Some(rng.gen_range(18..=80)),
    }
}

/// Generate `count` synthetic users
pub fn random_users<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<NewUser> {
    (0..count).map(|_| random_user(rng)).collect()
}

/// Insert `count` synthetic users in batches of `batch_size`
///
/// Returns the number of rows inserted.
pub async fn seed_users(pool: &PgPool, count: usize, batch_size: usize) -> Result<u64> {
    let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    while (inserted as usize) < count {
        let remaining = count - inserted as usize;
        let batch = random_users(&mut rand::thread_rng(), remaining.min(batch_size));

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO users (name, email, age, name_sort_key, email_sort_key) ");
        builder.push_values(batch, |mut row, user| {
            let name_key = name_sort_key(&user.name);
            let email_key = text_sort_key(&user.email);
            row.push_bind(user.name)
                .push_bind(user.email)
                .push_bind(user.age)
                .push_bind(name_key)
                .push_bind(email_key);
        });

        let result = builder.build().execute(&mut *tx).await?;
        inserted += result.rows_affected();
        tracing::info!(inserted, total = count, "Seeded batch");
    }

    tx.commit().await?;
    Ok(inserted)
}
