use sqlx::{Postgres, Transaction};

use crate::{
    core::sqlx_utils::{binds_query_as, page_offset, query_builder, SqlxBinds},
    model::employee::{Employee, TABLE_NAME},
};

#[derive(Clone, Debug, Default)]
pub struct EmployeeFilter {
    pub search: Option<String>,
    pub branch: Option<String>,
    pub department: Option<String>,
    pub district: Option<String>,
}

pub async fn paginate_employee(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    filter: EmployeeFilter,
) -> anyhow::Result<(Vec<Employee>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(search) = filter.search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!(
            "(full_name ILIKE ${0} OR file_number ILIKE ${0})",
            binds.len()
        ));
    }
    if let Some(branch) = filter.branch {
        binds.push(SqlxBinds::String(branch));
        filters.push(format!("branch = ${}", binds.len()));
    }
    if let Some(department) = filter.department {
        binds.push(SqlxBinds::String(department));
        filters.push(format!("department = ${}", binds.len()));
    }
    if let Some(district) = filter.district {
        binds.push(SqlxBinds::String(district));
        filters.push(format!("district = ${}", binds.len()));
    }

    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["total DESC NULLS LAST".to_string(), "id".to_string()],
        Some(page_size),
        Some(page_offset(page, page_size)),
    );
    let stmt_count = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );

    let q = binds_query_as::<Employee>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_employee_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
) -> anyhow::Result<Option<Employee>> {
    let stmt = query_builder(None, TABLE_NAME, &["id = $1".to_string()], vec![], None, None);
    let data = binds_query_as::<Employee>(&stmt, vec![SqlxBinds::Int(id)])
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_employee_by_file_number(
    tx: &mut Transaction<'_, Postgres>,
    file_number: &str,
) -> anyhow::Result<Option<Employee>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["file_number = $1".to_string()],
        vec![],
        None,
        None,
    );
    let data = binds_query_as::<Employee>(&stmt, vec![SqlxBinds::String(file_number.to_string())])
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

/// Case-insensitive exact match on the full name, lowest id first.
pub async fn get_employees_by_full_name(
    tx: &mut Transaction<'_, Postgres>,
    full_name: &str,
) -> anyhow::Result<Vec<Employee>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["lower(full_name) = lower($1)".to_string()],
        vec!["id".to_string()],
        None,
        None,
    );
    let data = binds_query_as::<Employee>(&stmt, vec![SqlxBinds::String(full_name.to_string())])
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

/// Largest stored total and related experience among other employees.
pub async fn get_max_experience(
    tx: &mut Transaction<'_, Postgres>,
    exclude_id: i32,
) -> anyhow::Result<(i32, i32)> {
    let res: (i32, i32) = sqlx::query_as(
        format!(
            r#"SELECT COALESCE(MAX(totalexp), 0), COALESCE(MAX(relatedexp), 0)
            FROM {}
            WHERE id <> $1"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(exclude_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(res)
}

pub async fn create_employee(
    tx: &mut Transaction<'_, Postgres>,
    employee: &Employee,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, file_number, full_name, sex, employment_date, last_dop, job_grade,
        job_category, current_position, branch, department, district, region, field_of_study,
        educational_level, twin_branch, cluster, individual_pms, indpms25, totalexp, totalexp20,
        relatedexp, expafterpromo, tmdrec20, disrec15, total, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
        $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(employee.id)
    .bind(&employee.file_number)
    .bind(&employee.full_name)
    .bind(&employee.sex)
    .bind(employee.employment_date)
    .bind(employee.last_dop)
    .bind(&employee.job_grade)
    .bind(&employee.job_category)
    .bind(&employee.current_position)
    .bind(&employee.branch)
    .bind(&employee.department)
    .bind(&employee.district)
    .bind(&employee.region)
    .bind(&employee.field_of_study)
    .bind(&employee.educational_level)
    .bind(&employee.twin_branch)
    .bind(&employee.cluster)
    .bind(employee.individual_pms)
    .bind(employee.indpms25)
    .bind(employee.totalexp)
    .bind(employee.totalexp20)
    .bind(employee.relatedexp)
    .bind(employee.expafterpromo)
    .bind(employee.tmdrec20)
    .bind(employee.disrec15)
    .bind(employee.total)
    .bind(employee.created_date)
    .bind(employee.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_employee(
    tx: &mut Transaction<'_, Postgres>,
    employee: &Employee,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET file_number = $1, full_name = $2, sex = $3, employment_date = $4, last_dop = $5,
        job_grade = $6, job_category = $7, current_position = $8, branch = $9, department = $10,
        district = $11, region = $12, field_of_study = $13, educational_level = $14,
        twin_branch = $15, cluster = $16, updated_date = $17
        WHERE id = $18"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&employee.file_number)
    .bind(&employee.full_name)
    .bind(&employee.sex)
    .bind(employee.employment_date)
    .bind(employee.last_dop)
    .bind(&employee.job_grade)
    .bind(&employee.job_category)
    .bind(&employee.current_position)
    .bind(&employee.branch)
    .bind(&employee.department)
    .bind(&employee.district)
    .bind(&employee.region)
    .bind(&employee.field_of_study)
    .bind(&employee.educational_level)
    .bind(&employee.twin_branch)
    .bind(&employee.cluster)
    .bind(employee.updated_date)
    .bind(employee.id)
    .execute(&mut **tx)
    .await?;
    update_evaluation(tx, employee).await
}

/// Persists the score columns of the employee.
pub async fn update_evaluation(
    tx: &mut Transaction<'_, Postgres>,
    employee: &Employee,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET individual_pms = $1, indpms25 = $2, totalexp = $3, totalexp20 = $4, relatedexp = $5,
        expafterpromo = $6, tmdrec20 = $7, disrec15 = $8, total = $9, updated_date = $10
        WHERE id = $11"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(employee.individual_pms)
    .bind(employee.indpms25)
    .bind(employee.totalexp)
    .bind(employee.totalexp20)
    .bind(employee.relatedexp)
    .bind(employee.expafterpromo)
    .bind(employee.tmdrec20)
    .bind(employee.disrec15)
    .bind(employee.total)
    .bind(employee.updated_date)
    .bind(employee.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
