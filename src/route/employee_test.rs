use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    core::test_utils::{generate_test_user, init_test_app_state},
    factory::employee::EmployeeFactory,
    init_openapi_route,
    model::{employee::Employee, notification::Notification, user::UserRole},
};

fn assert_close(left: Option<f64>, right: f64) {
    let Some(left) = left else {
        panic!("expected {}, got null", right);
    };
    assert!((left - right).abs() < 1e-9, "expected {}, got {}", right, left);
}

#[sqlx::test]
async fn test_paginate_employee_api_district_scope(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let (app_state, config) = init_test_app_state(pool)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let district_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "district_user",
        UserRole::DistrictManager,
    )
    .await?;
    let admin_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "admin_user",
        UserRole::Admin,
    )
    .await?;
    let mut employee_factory = EmployeeFactory::<()>::new();
    employee_factory.modified_many(|data, idx, _| Employee {
        district: if idx < 2 {
            "Central".to_string()
        } else {
            "South".to_string()
        },
        full_name: if idx == 4 {
            "Tigist Alemu".to_string()
        } else {
            data.full_name.clone()
        },
        ..data.clone()
    });
    employee_factory.generate_many(&app_state.db, 5, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When district manager
    let resp = cli
        .get("/api/employee/")
        .header("authorization", format!("Bearer {}", district_user.token))
        .send()
        .await;

    // Expect own district only
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("counts").assert_i64(2);
    for item in body.get("results").array().iter() {
        item.object().get("district").assert_string("Central");
    }

    // When admin
    let resp = cli
        .get("/api/employee/")
        .header("authorization", format!("Bearer {}", admin_user.token))
        .query("page_size", &2)
        .send()
        .await;

    // Expect every district
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("counts").assert_i64(5);
    body.get("page_count").assert_i64(3);
    body.get("results").array().assert_len(2);

    // When searching by name
    let resp = cli
        .get("/api/employee/")
        .header("authorization", format!("Bearer {}", admin_user.token))
        .query("search", &"tigist")
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let results = json.value().object().get("results").array();
    results.assert_len(1);
    results
        .get(0)
        .object()
        .get("full_name")
        .assert_string("Tigist Alemu");
    Ok(())
}

#[sqlx::test]
async fn test_employee_detail_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let (app_state, config) = init_test_app_state(pool)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let district_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "district_user",
        UserRole::DistrictManager,
    )
    .await?;
    let mut employee_factory = EmployeeFactory::<()>::new();
    employee_factory.modified_many(|data, idx, _| Employee {
        district: if idx == 0 {
            "Central".to_string()
        } else {
            "South".to_string()
        },
        ..data.clone()
    });
    let employees = employee_factory.generate_many(&app_state.db, 2, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When own district
    let resp = cli
        .get("/api/employee/detail/")
        .header("authorization", format!("Bearer {}", district_user.token))
        .query("id", &employees[0].id)
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("id").assert_i64(employees[0].id as i64);
    body.get("file_number").assert_string(&employees[0].file_number);

    // When other district
    let resp = cli
        .get("/api/employee/detail/")
        .header("authorization", format!("Bearer {}", district_user.token))
        .query("id", &employees[1].id)
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::FORBIDDEN);

    // When unknown id
    let resp = cli
        .get("/api/employee/detail/")
        .header("authorization", format!("Bearer {}", district_user.token))
        .query("id", &(employees[1].id + 1))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_create_employee_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let (app_state, config) = init_test_app_state(pool)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let admin_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "admin_user",
        UserRole::Admin,
    )
    .await?;
    let manager_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "manager_user",
        UserRole::Manager,
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let payload = json!({
        "id": 1001,
        "file_number": "BB-1001",
        "full_name": "Meron Tadesse",
        "sex": "Female",
        "employment_date": "2010-01-15",
        "branch": "Bole",
        "department": "Retail Banking",
        "district": "Central",
        "individual_pms": 80.0
    });

    // When
    let resp = cli
        .post("/api/employee/")
        .header("authorization", format!("Bearer {}", admin_user.token))
        .body_json(&payload)
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let employee: Employee = sqlx::query_as("SELECT * FROM public.employee WHERE id = 1001")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(employee.full_name, "Meron Tadesse");
    assert!(employee.totalexp.unwrap_or_default() > 0);
    assert_close(employee.totalexp20, 20.0);
    assert_close(employee.expafterpromo, 0.0);
    assert_close(employee.indpms25, 20.0);
    assert_close(employee.tmdrec20, 0.0);
    assert_close(employee.disrec15, 0.0);
    assert_close(employee.total, 40.0);

    // When duplicate id
    let resp = cli
        .post("/api/employee/")
        .header("authorization", format!("Bearer {}", admin_user.token))
        .body_json(&payload)
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When invalid sex
    let resp = cli
        .post("/api/employee/")
        .header("authorization", format!("Bearer {}", admin_user.token))
        .body_json(&json!({
            "id": 1002,
            "file_number": "BB-1002",
            "full_name": "Yonas Tesfaye",
            "sex": "Unknown",
            "employment_date": "2012-05-01"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "sex must be one of: Male, Female"}))
        .await;

    // When manager
    let resp = cli
        .post("/api/employee/")
        .header("authorization", format!("Bearer {}", manager_user.token))
        .body_json(&json!({
            "id": 1003,
            "file_number": "BB-1003",
            "full_name": "Yonas Tesfaye",
            "sex": "Male",
            "employment_date": "2012-05-01"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::FORBIDDEN);
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.employee")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(count.0, 1);
    Ok(())
}

#[sqlx::test]
async fn test_update_employee_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let (app_state, config) = init_test_app_state(pool)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let admin_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "admin_user",
        UserRole::Admin,
    )
    .await?;
    let mut employee_factory = EmployeeFactory::new();
    let employee = employee_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .put("/api/employee/")
        .header("authorization", format!("Bearer {}", admin_user.token))
        .query("id", &employee.id)
        .body_json(&json!({
            "id": employee.id,
            "file_number": employee.file_number,
            "full_name": employee.full_name,
            "sex": "Male",
            "employment_date": "2015-03-01",
            "last_dop": "2020-03-01",
            "branch": "Piassa",
            "district": "North"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let updated: Employee = sqlx::query_as("SELECT * FROM public.employee WHERE id = $1")
        .bind(employee.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(updated.sex, "Male");
    assert_eq!(updated.branch, "Piassa");
    assert_eq!(updated.district, "North");
    assert!(updated.last_dop.is_some());
    assert_eq!(updated.individual_pms, employee.individual_pms);

    // When changing the id
    let resp = cli
        .put("/api/employee/")
        .header("authorization", format!("Bearer {}", admin_user.token))
        .query("id", &employee.id)
        .body_json(&json!({
            "id": employee.id + 1,
            "file_number": employee.file_number,
            "full_name": employee.full_name,
            "sex": "Male",
            "employment_date": "2015-03-01"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "employee id cannot be changed"}))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_evaluation_flow_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let (app_state, config) = init_test_app_state(pool)?;
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let manager_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "manager_user",
        UserRole::Manager,
    )
    .await?;
    let district_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        &config,
        "district_user",
        UserRole::DistrictManager,
    )
    .await?;
    let mut employee_factory = EmployeeFactory::<()>::new();
    employee_factory.modified_one(|data, _| Employee {
        district: "Central".to_string(),
        ..data.clone()
    });
    let employee = employee_factory.generate_one(&app_state.db, ()).await?;
    employee_factory.modified_one(|data, _| Employee {
        district: "South".to_string(),
        ..data.clone()
    });
    let other_district = employee_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When manager sets PMS
    let resp = cli
        .put("/api/employee/pms/")
        .header("authorization", format!("Bearer {}", manager_user.token))
        .query("id", &employee.id)
        .body_json(&json!({"score": 80.0}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("indpms25").assert_f64(20.0);
    body.get("total").assert_f64(20.0);

    // When score is out of range
    let resp = cli
        .put("/api/employee/pms/")
        .header("authorization", format!("Bearer {}", manager_user.token))
        .query("id", &employee.id)
        .body_json(&json!({"score": 120.0}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "score must be between 0 and 100"}))
        .await;

    // When manager recommends
    let resp = cli
        .put("/api/employee/manager-recommendation/")
        .header("authorization", format!("Bearer {}", manager_user.token))
        .query("id", &employee.id)
        .body_json(&json!({"score": 50.0}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("tmdrec20").assert_f64(10.0);
    let notification: Notification = sqlx::query_as(
        "SELECT * FROM public.notification WHERE recipient_role = 'district_manager'",
    )
    .fetch_one(&app_state.db)
    .await?;
    assert_eq!(notification.notification_type, "recommendation");
    assert_eq!(notification.employee_id, Some(employee.id.to_string()));

    // When manager tries the district recommendation
    let resp = cli
        .put("/api/employee/district-recommendation/")
        .header("authorization", format!("Bearer {}", manager_user.token))
        .query("id", &employee.id)
        .body_json(&json!({"score": 60.0}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::FORBIDDEN);

    // When district manager recommends
    let resp = cli
        .put("/api/employee/district-recommendation/")
        .header("authorization", format!("Bearer {}", district_user.token))
        .query("id", &employee.id)
        .body_json(&json!({"score": 60.0}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("disrec15").assert_f64(9.0);
    let stored: Employee = sqlx::query_as("SELECT * FROM public.employee WHERE id = $1")
        .bind(employee.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_close(stored.total, 39.0);
    let notification: Notification =
        sqlx::query_as("SELECT * FROM public.notification WHERE recipient_role = 'admin'")
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(notification.notification_type, "recommendation");

    // When district manager recommends outside their district
    let resp = cli
        .put("/api/employee/district-recommendation/")
        .header("authorization", format!("Bearer {}", district_user.token))
        .query("id", &other_district.id)
        .body_json(&json!({"score": 60.0}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::FORBIDDEN);
    let untouched: Employee = sqlx::query_as("SELECT * FROM public.employee WHERE id = $1")
        .bind(other_district.id)
        .fetch_one(&app_state.db)
        .await?;
    assert!(untouched.disrec15.is_none());
    let admin_notifications: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM public.notification WHERE recipient_role = 'admin'")
            .fetch_one(&app_state.db)
            .await?;
    assert_eq!(admin_notifications.0, 1);

    // When reading the evaluation
    let resp = cli
        .get("/api/employee/evaluation/")
        .header("authorization", format!("Bearer {}", district_user.token))
        .query("id", &employee.id)
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("tmdrec20").assert_f64(10.0);
    body.get("disrec15").assert_f64(9.0);
    Ok(())
}
