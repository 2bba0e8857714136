//! Join codes for teams.

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use rand::{Rng, distr::Alphanumeric};

use crate::schema::teams;

pub const CODE_LEN: usize = 6;

pub fn generate_code(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(CODE_LEN)
        .map(char::from)
        .collect()
}

/// Generates codes until one is found which no existing team holds.
pub fn get_unique_team_code(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<String> {
    loop {
        let code = generate_code(&mut rand::rng());

        let is_duplicate = diesel::dsl::select(diesel::dsl::exists(
            teams::table.filter(teams::code.eq(&code)),
        ))
        .get_result::<bool>(conn)?;

        if !is_duplicate {
            return Ok(code);
        } else {
            tracing::debug!("team code collision, regenerating");
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn codes_are_six_alphanumerics() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let code = generate_code(&mut rng);
            assert_eq!(code.chars().count(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()), "{code}");
        }
    }

    #[test]
    fn same_seed_same_code() {
        let a = generate_code(&mut ChaCha8Rng::seed_from_u64(1));
        let b = generate_code(&mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn unique_code_skips_existing() {
        let mut conn = crate::test::test_conn();

        let taken: Vec<String> = (0..20)
            .map(|i| {
                let code = get_unique_team_code(&mut conn).unwrap();
                diesel::insert_into(teams::table)
                    .values((
                        teams::id.eq(format!("team-{i}")),
                        teams::name.eq("Team"),
                        teams::code.eq(&code),
                    ))
                    .execute(&mut conn)
                    .unwrap();
                code
            })
            .collect();

        let mut deduped = taken.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), taken.len());
    }
}
