//! Candidate persistence over SQLite.

use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::candidates::models::Candidate;
use crate::scoring::Scores;

const SELECT_CANDIDATE: &str = r#"
    SELECT phone, name, age, email, education, major, skills, years, blog, github,
           native, universities, companies, job_position, expect_cities, expect_salary,
           experience_score, education_score, technical_score, average_score,
           resume_path, hash, interview_record
    FROM candidates
"#;

/// Inserts a new candidate. A taken phone number or hash surfaces as a
/// unique-violation database error.
pub async fn insert(pool: &SqlitePool, candidate: &Candidate) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO candidates
            (phone, name, age, email, education, major, skills, years, blog, github,
             native, universities, companies, job_position, expect_cities, expect_salary,
             experience_score, education_score, technical_score, average_score,
             resume_path, hash, interview_record)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(candidate.phone)
    .bind(&candidate.name)
    .bind(candidate.age)
    .bind(&candidate.email)
    .bind(candidate.education.as_str())
    .bind(&candidate.major)
    .bind(Json(&candidate.skills))
    .bind(candidate.years)
    .bind(&candidate.blog)
    .bind(&candidate.github)
    .bind(&candidate.native)
    .bind(Json(&candidate.universities))
    .bind(Json(&candidate.companies))
    .bind(candidate.job_position.as_str())
    .bind(Json(&candidate.expect_cities))
    .bind(candidate.expect_salary)
    .bind(candidate.experience_score)
    .bind(candidate.education_score)
    .bind(candidate.technical_score)
    .bind(candidate.average_score)
    .bind(&candidate.resume_path)
    .bind(&candidate.hash)
    .bind(&candidate.interview_record)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, phone: i64) -> Result<Option<Candidate>, sqlx::Error> {
    sqlx::query_as::<_, Candidate>(&format!("{SELECT_CANDIDATE} WHERE phone = ?"))
        .bind(phone)
        .fetch_optional(pool)
        .await
}

/// Overwrites every column of the row keyed by `candidate.phone`.
/// Returns false when no such row exists.
pub async fn update(pool: &SqlitePool, candidate: &Candidate) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE candidates SET
            name = ?, age = ?, email = ?, education = ?, major = ?, skills = ?, years = ?,
            blog = ?, github = ?, native = ?, universities = ?, companies = ?,
            job_position = ?, expect_cities = ?, expect_salary = ?,
            experience_score = ?, education_score = ?, technical_score = ?, average_score = ?,
            resume_path = ?, hash = ?, interview_record = ?
        WHERE phone = ?
        "#,
    )
    .bind(&candidate.name)
    .bind(candidate.age)
    .bind(&candidate.email)
    .bind(candidate.education.as_str())
    .bind(&candidate.major)
    .bind(Json(&candidate.skills))
    .bind(candidate.years)
    .bind(&candidate.blog)
    .bind(&candidate.github)
    .bind(&candidate.native)
    .bind(Json(&candidate.universities))
    .bind(Json(&candidate.companies))
    .bind(candidate.job_position.as_str())
    .bind(Json(&candidate.expect_cities))
    .bind(candidate.expect_salary)
    .bind(candidate.experience_score)
    .bind(candidate.education_score)
    .bind(candidate.technical_score)
    .bind(candidate.average_score)
    .bind(&candidate.resume_path)
    .bind(&candidate.hash)
    .bind(&candidate.interview_record)
    .bind(candidate.phone)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Writes only the four score columns. Takes any executor so bulk rescoring
/// can run it inside a transaction.
pub async fn update_scores<'e, E>(executor: E, phone: i64, scores: Scores) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE candidates
        SET experience_score = ?, education_score = ?, technical_score = ?, average_score = ?
        WHERE phone = ?
        "#,
    )
    .bind(scores.experience)
    .bind(scores.education)
    .bind(scores.technical)
    .bind(scores.average)
    .bind(phone)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, phone: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM candidates WHERE phone = ?")
        .bind(phone)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Candidates whose name or email contains `query`, best average score first.
/// An empty query matches everyone.
pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Candidate>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(query));
    sqlx::query_as::<_, Candidate>(&format!(
        r"{SELECT_CANDIDATE}
        WHERE name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\'
        ORDER BY average_score DESC, phone ASC"
    ))
    .bind(pattern.clone())
    .bind(pattern)
    .fetch_all(pool)
    .await
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Candidate>, sqlx::Error> {
    sqlx::query_as::<_, Candidate>(&format!("{SELECT_CANDIDATE} ORDER BY phone"))
        .fetch_all(pool)
        .await
}

pub async fn find_by_hash(pool: &SqlitePool, hash: &str) -> Result<Option<Candidate>, sqlx::Error> {
    if hash.is_empty() {
        return Ok(None);
    }
    sqlx::query_as::<_, Candidate>(&format!("{SELECT_CANDIDATE} WHERE hash = ?"))
        .bind(hash)
        .fetch_optional(pool)
        .await
}

pub async fn update_interview_record(
    pool: &SqlitePool,
    phone: i64,
    record: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE candidates SET interview_record = ? WHERE phone = ?")
        .bind(record)
        .bind(phone)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::models::{EducationLevel, JobPosition};
    use crate::db::memory_pool;

    fn candidate(phone: i64, name: &str, average: f64) -> Candidate {
        Candidate {
            phone,
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            average_score: average,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trips_every_column() {
        let pool = memory_pool().await;
        let original = Candidate {
            phone: 13800138000,
            name: "张三".into(),
            age: 28,
            email: "zs@example.com".into(),
            education: EducationLevel::Master,
            major: "软件工程".into(),
            skills: vec!["rust".into(), "go".into()],
            years: 4,
            blog: "https://blog".into(),
            github: "https://github.com/zs".into(),
            native: "杭州".into(),
            universities: vec!["浙江大学".into()],
            companies: vec!["字节跳动".into()],
            job_position: JobPosition::BackEnd,
            expect_cities: vec!["上海".into(), "杭州".into()],
            expect_salary: 30000,
            experience_score: 7.5,
            education_score: 6.1,
            technical_score: 5.2,
            average_score: 6.3,
            resume_path: "resumes/1_cv.pdf".into(),
            hash: "abc".into(),
            interview_record: "good".into(),
        };
        insert(&pool, &original).await.unwrap();

        let loaded = get(&pool, original.phone).await.unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(get(&pool, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_phone_is_unique_violation() {
        let pool = memory_pool().await;
        insert(&pool, &candidate(1, "A", 0.0)).await.unwrap();
        let err = insert(&pool, &candidate(1, "B", 0.0)).await.unwrap_err();
        let db_err = err.as_database_error().unwrap();
        assert!(db_err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_hash_is_unique_but_empty_hash_is_not() {
        let pool = memory_pool().await;
        insert(&pool, &candidate(1, "A", 0.0)).await.unwrap();
        insert(&pool, &candidate(2, "B", 0.0)).await.unwrap();

        let mut with_hash = candidate(3, "C", 0.0);
        with_hash.hash = "deadbeef".into();
        insert(&pool, &with_hash).await.unwrap();
        with_hash.phone = 4;
        assert!(insert(&pool, &with_hash).await.is_err());

        let found = find_by_hash(&pool, "deadbeef").await.unwrap().unwrap();
        assert_eq!(found.phone, 3);
        assert!(find_by_hash(&pool, "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_rows() {
        let pool = memory_pool().await;
        let mut c = candidate(1, "A", 0.0);
        assert!(!update(&pool, &c).await.unwrap());
        insert(&pool, &c).await.unwrap();

        c.name = "Renamed".into();
        c.skills = vec!["kafka".into()];
        assert!(update(&pool, &c).await.unwrap());
        assert_eq!(get(&pool, 1).await.unwrap().unwrap(), c);

        assert!(delete(&pool, 1).await.unwrap());
        assert!(!delete(&pool, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_matches_name_or_email_sorted_by_average() {
        let pool = memory_pool().await;
        insert(&pool, &candidate(1, "Alice", 5.0)).await.unwrap();
        insert(&pool, &candidate(2, "Bob", 8.0)).await.unwrap();
        let mut carol = candidate(3, "Carol", 6.5);
        carol.email = "carol@alice-corp.com".into();
        insert(&pool, &carol).await.unwrap();

        let found = search(&pool, "alice").await.unwrap();
        let phones: Vec<i64> = found.iter().map(|c| c.phone).collect();
        assert_eq!(phones, vec![3, 1]);

        let everyone = search(&pool, "").await.unwrap();
        let phones: Vec<i64> = everyone.iter().map(|c| c.phone).collect();
        assert_eq!(phones, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let pool = memory_pool().await;
        insert(&pool, &candidate(1, "A_B", 0.0)).await.unwrap();
        insert(&pool, &candidate(2, "AXB", 0.0)).await.unwrap();

        let found = search(&pool, "a_b").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].phone, 1);
        assert!(search(&pool, "%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interview_record_touches_only_that_column() {
        let pool = memory_pool().await;
        let c = candidate(1, "A", 4.2);
        insert(&pool, &c).await.unwrap();

        assert!(update_interview_record(&pool, 1, "second round").await.unwrap());
        assert!(!update_interview_record(&pool, 2, "nobody").await.unwrap());

        let loaded = get(&pool, 1).await.unwrap().unwrap();
        assert_eq!(loaded.interview_record, "second round");
        assert_eq!(loaded.average_score, 4.2);
        assert_eq!(loaded.name, "A");
    }

    #[tokio::test]
    async fn test_update_scores_inside_transaction() {
        let pool = memory_pool().await;
        insert(&pool, &candidate(1, "A", 0.0)).await.unwrap();

        let scores = Scores {
            experience: 5.0,
            education: 2.0,
            technical: 5.0,
            average: 4.0,
        };
        let mut tx = pool.begin().await.unwrap();
        update_scores(&mut *tx, 1, scores).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(get(&pool, 1).await.unwrap().unwrap().scores(), scores);
    }
}
