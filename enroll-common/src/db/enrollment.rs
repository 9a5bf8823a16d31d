//! Enrollment finalizer
//!
//! Turns a completed wizard into one row in each of the six enrollment
//! tables. All inserts share one transaction: either every row is written
//! under a single `StudentId`, or nothing is.
//!
//! Calling [`persist_enrollment`] twice with the same data writes two full
//! sets of rows. Callers guard against double submission by clearing the
//! session after the first success.

use crate::wizard::{CompleteEnrollment, DocumentKind};
use crate::Result;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

/// Persist a completed enrollment, returning the generated `StudentId`
pub async fn persist_enrollment(pool: &SqlitePool, enrollment: CompleteEnrollment<'_>) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let student_id = insert_student(&mut tx, &enrollment).await?;
    debug!("Inserted student row {}", student_id);

    insert_parent(&mut tx, student_id, &enrollment).await?;
    insert_student_course(&mut tx, student_id, &enrollment).await?;
    insert_enrollment_status(&mut tx, student_id, &enrollment).await?;
    insert_education_background(&mut tx, student_id, &enrollment).await?;
    insert_requirements(&mut tx, student_id, &enrollment).await?;

    // Dropping an uncommitted transaction rolls it back, so any `?` above
    // leaves no partial rows behind
    tx.commit().await?;

    info!("Enrollment persisted for StudentId {}", student_id);
    Ok(student_id)
}

async fn insert_student(
    tx: &mut Transaction<'_, Sqlite>,
    enrollment: &CompleteEnrollment<'_>,
) -> Result<i64> {
    let pd = enrollment.personal;

    let student_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO student (FirstName, LastName, MiddleName, Address, District, LRN, Contact,
                             Email, Gender, BirthDate, Age, Citizenship, CivilStatus, Religion)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING StudentId
        "#,
    )
    .bind(&pd.first_name)
    .bind(&pd.last_name)
    .bind(&pd.middle_name)
    .bind(&pd.address)
    .bind(&pd.district)
    .bind(&pd.lrn)
    .bind(&pd.contact)
    .bind(&pd.email)
    .bind(&pd.gender)
    .bind(&pd.birthdate)
    .bind(&pd.age)
    .bind(&pd.citizenship)
    .bind(&pd.civil_status)
    .bind(&pd.religion)
    .fetch_one(&mut **tx)
    .await?;

    Ok(student_id)
}

async fn insert_parent(
    tx: &mut Transaction<'_, Sqlite>,
    student_id: i64,
    enrollment: &CompleteEnrollment<'_>,
) -> Result<()> {
    let pd = enrollment.personal;

    sqlx::query(
        r#"
        INSERT INTO parent (StudentId, FatherName, FatherOccupation, FatherContact,
                            MotherName, MotherOccupation, MotherContact,
                            GuardianName, Occupation, Contact)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(student_id)
    .bind(&pd.father_name)
    .bind(&pd.father_occupation)
    .bind(&pd.father_contact)
    .bind(&pd.mother_name)
    .bind(&pd.mother_occupation)
    .bind(&pd.mother_contact)
    .bind(&pd.guardian_name)
    .bind(&pd.guardian_occupation)
    .bind(&pd.guardian_contact)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_student_course(
    tx: &mut Transaction<'_, Sqlite>,
    student_id: i64,
    enrollment: &CompleteEnrollment<'_>,
) -> Result<()> {
    sqlx::query("INSERT INTO studentcourse (StudentId, IdNumber, YearLvl) VALUES (?, ?, ?)")
        .bind(student_id)
        .bind(&enrollment.course.id_number)
        .bind(&enrollment.course.year_level)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn insert_enrollment_status(
    tx: &mut Transaction<'_, Sqlite>,
    student_id: i64,
    enrollment: &CompleteEnrollment<'_>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO enrollment (StudentId, EnrollmentStatus, StudentStatus) VALUES (?, ?, ?)",
    )
    .bind(student_id)
    .bind(&enrollment.course.enroll_status)
    .bind(&enrollment.course.student_status)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_education_background(
    tx: &mut Transaction<'_, Sqlite>,
    student_id: i64,
    enrollment: &CompleteEnrollment<'_>,
) -> Result<()> {
    let edu = enrollment.education;

    sqlx::query(
        r#"
        INSERT INTO edubackground (StudentId, first_gen, elementary, elem_year, elem_honors,
                                   highschool, hs_year, hs_honors,
                                   college, college_year, college_honors)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(student_id)
    .bind(&edu.first_gen)
    .bind(&edu.elementary)
    .bind(&edu.elem_year)
    .bind(&edu.elem_honors)
    .bind(&edu.highschool)
    .bind(&edu.hs_year)
    .bind(&edu.hs_honors)
    .bind(&edu.college)
    .bind(&edu.college_year)
    .bind(&edu.college_honors)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_requirements(
    tx: &mut Transaction<'_, Sqlite>,
    student_id: i64,
    enrollment: &CompleteEnrollment<'_>,
) -> Result<()> {
    let uploads = enrollment.uploads;

    sqlx::query(
        "INSERT INTO requirements (StudentId, medical_certificate, grades, org_fee) VALUES (?, ?, ?, ?)",
    )
    .bind(student_id)
    .bind(uploads.get(DocumentKind::MedicalCertificate))
    .bind(uploads.get(DocumentKind::Grades))
    .bind(uploads.get(DocumentKind::OrgFee))
    .execute(&mut **tx)
    .await?;

    Ok(())
}
