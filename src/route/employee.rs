use std::sync::Arc;

use chrono::{Datelike, Local};
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use tracing::info;

use crate::{
    core::{
        evaluation::{
            district_recommendation_score, evaluate, manager_recommendation_score, pms_score,
            recalculate_total,
        },
        security::{get_user_from_token, BearerAuthorization},
        sqlx_utils::clamp_page_size,
        utils::parse_date,
        validation::{one_of, positive, require, score, ValidationError},
    },
    model::{
        employee::Employee,
        user::{User, UserRole},
    },
    repository::{
        employee::{
            create_employee, get_employee_by_file_number, get_employee_by_id, get_max_experience,
            paginate_employee, update_employee, update_evaluation, EmployeeFilter,
        },
        notification::{create_notification, NotificationData},
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateResponse, UnauthorizedResponse,
        },
        employee::{
            EmployeeDetailResponses, EmployeeRequest, EmployeeSaveResponses, EvaluationResponses,
            PaginateEmployeeResponses, ScoreRequest,
        },
    },
    AppState,
};

const SEXES: [&str; 2] = ["Male", "Female"];

/// District managers only reach employees of their own district.
fn can_view(user: &User, employee: &Employee) -> bool {
    match user.user_role() {
        Some(UserRole::DistrictManager) => {
            user.district.as_deref() == Some(employee.district.as_str())
        }
        Some(_) => true,
        None => false,
    }
}

/// Applies the employee form onto `employee`, keeping its score columns.
pub fn apply_employee_request(
    json: EmployeeRequest,
    employee: Option<Employee>,
) -> Result<Employee, ValidationError> {
    positive("id", json.id)?;
    require("file_number", &json.file_number)?;
    require("full_name", &json.full_name)?;
    one_of("sex", &json.sex, &SEXES)?;
    require("employment_date", &json.employment_date)?;
    let employment_date =
        parse_date(&json.employment_date).ok_or(ValidationError::InvalidDate("employment_date"))?;
    let last_dop = match json.last_dop.filter(|x| !x.trim().is_empty()) {
        Some(val) => Some(parse_date(&val).ok_or(ValidationError::InvalidDate("last_dop"))?),
        None => None,
    };
    let individual_pms = match json.individual_pms {
        Some(val) => Some(score("individual_pms", val)?),
        None => employee.as_ref().and_then(|x| x.individual_pms),
    };
    let now = Local::now().fixed_offset();
    let previous = employee.as_ref();
    Ok(Employee {
        id: json.id,
        file_number: json.file_number.trim().to_string(),
        full_name: json.full_name.trim().to_string(),
        sex: json.sex,
        employment_date,
        last_dop,
        job_grade: json.job_grade.unwrap_or_default(),
        job_category: json.job_category.unwrap_or_default(),
        current_position: json.current_position.unwrap_or_default(),
        branch: json.branch.unwrap_or_default(),
        department: json.department.unwrap_or_default(),
        district: json.district.unwrap_or_default(),
        region: json.region.unwrap_or_default(),
        field_of_study: json.field_of_study.unwrap_or_default(),
        educational_level: json.educational_level.unwrap_or_default(),
        twin_branch: json.twin_branch,
        cluster: json.cluster,
        individual_pms,
        indpms25: None,
        totalexp: None,
        totalexp20: None,
        relatedexp: None,
        expafterpromo: None,
        tmdrec20: previous.and_then(|x| x.tmdrec20),
        disrec15: previous.and_then(|x| x.disrec15),
        total: None,
        created_date: previous.and_then(|x| x.created_date).or(Some(now)),
        updated_date: Some(now),
    })
}

#[derive(Tags)]
enum ApiEmployeeTags {
    Employee,
}

pub struct ApiEmployee;

#[OpenApi]
impl ApiEmployee {
    #[oai(path = "/employee/", method = "get", tag = "ApiEmployeeTags::Employee")]
    #[allow(clippy::too_many_arguments)]
    async fn paginate_employee_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(branch): Query<Option<String>>,
        Query(department): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateEmployeeResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PaginateEmployeeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "paginate_employee_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return PaginateEmployeeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "paginate_employee_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return PaginateEmployeeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "paginate_employee_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return PaginateEmployeeResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let district = match user.user_role() {
            Some(UserRole::DistrictManager) => Some(user.district.clone().unwrap_or_default()),
            _ => None,
        };
        let page = page.unwrap_or(1).max(1);
        let page_size = clamp_page_size(page_size);
        let filter = EmployeeFilter {
            search,
            branch,
            department,
            district,
        };
        let (data, counts, page_count) =
            match paginate_employee(&mut tx, page, page_size, filter).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateEmployeeResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.employee",
                            "paginate_employee_api",
                            "paginate_employee",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        PaginateEmployeeResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results: data.into_iter().map(|x| x.into()).collect(),
        }))
    }

    #[oai(
        path = "/employee/detail/",
        method = "get",
        tag = "ApiEmployeeTags::Employee"
    )]
    async fn detail_employee_api(
        &self,
        Query(id): Query<i32>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> EmployeeDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "detail_employee_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return EmployeeDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "detail_employee_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "detail_employee_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return EmployeeDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let data = match get_employee_by_id(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "detail_employee_api",
                        "get_employee_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(data) = data else {
            return EmployeeDetailResponses::NotFound(Json(NotFoundResponse::new(format!(
                "employee with id = {} not found",
                id
            ))));
        };
        if !can_view(&user, &data) {
            return EmployeeDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }
        EmployeeDetailResponses::Ok(Json(data.into()))
    }

    #[oai(path = "/employee/", method = "post", tag = "ApiEmployeeTags::Employee")]
    async fn create_employee_api(
        &self,
        json: Json<EmployeeRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> EmployeeSaveResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "create_employee_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "create_employee_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "create_employee_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return EmployeeSaveResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return EmployeeSaveResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let mut employee = match apply_employee_request(json.0, None) {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };
        let by_id = get_employee_by_id(&mut tx, employee.id).await;
        let by_file_number = get_employee_by_file_number(&mut tx, &employee.file_number).await;
        match (by_id, by_file_number) {
            (Ok(None), Ok(None)) => {}
            (Ok(_), Ok(_)) => {
                return EmployeeSaveResponses::BadRequest(Json(BadRequestResponse::new(
                    "employee id or file number already exists",
                )))
            }
            (Err(err), _) | (_, Err(err)) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "create_employee_api",
                        "check existing employee",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let (max_totalexp, max_relatedexp) = match get_max_experience(&mut tx, employee.id).await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "create_employee_api",
                        "get_max_experience",
                        &err.to_string(),
                    ),
                ))
            }
        };
        evaluate(
            &mut employee,
            Local::now().year(),
            max_totalexp,
            max_relatedexp,
        );
        if let Err(err) = create_employee(&mut tx, &employee).await {
            return EmployeeSaveResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "create_employee_api",
                    "create_employee",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return EmployeeSaveResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "create_employee_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        EmployeeSaveResponses::Created(Json(employee.into()))
    }

    #[oai(path = "/employee/", method = "put", tag = "ApiEmployeeTags::Employee")]
    async fn update_employee_api(
        &self,
        Query(id): Query<i32>,
        json: Json<EmployeeRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> EmployeeSaveResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "update_employee_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "update_employee_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "update_employee_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return EmployeeSaveResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return EmployeeSaveResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let existing = match get_employee_by_id(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "update_employee_api",
                        "get_employee_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(existing) = existing else {
            return EmployeeSaveResponses::NotFound(Json(NotFoundResponse::new(format!(
                "employee with id = {} not found",
                id
            ))));
        };
        if json.id != id {
            return EmployeeSaveResponses::BadRequest(Json(BadRequestResponse::new(
                "employee id cannot be changed",
            )));
        }

        let mut employee = match apply_employee_request(json.0, Some(existing)) {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };
        match get_employee_by_file_number(&mut tx, &employee.file_number).await {
            Ok(Some(other)) if other.id != id => {
                return EmployeeSaveResponses::BadRequest(Json(BadRequestResponse::new(
                    "employee id or file number already exists",
                )))
            }
            Ok(_) => {}
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "update_employee_api",
                        "get_employee_by_file_number",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let (max_totalexp, max_relatedexp) = match get_max_experience(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return EmployeeSaveResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "update_employee_api",
                        "get_max_experience",
                        &err.to_string(),
                    ),
                ))
            }
        };
        evaluate(
            &mut employee,
            Local::now().year(),
            max_totalexp,
            max_relatedexp,
        );
        if let Err(err) = update_employee(&mut tx, &employee).await {
            return EmployeeSaveResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "update_employee_api",
                    "update_employee",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return EmployeeSaveResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "update_employee_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        EmployeeSaveResponses::Ok(Json(employee.into()))
    }

    #[oai(
        path = "/employee/evaluation/",
        method = "get",
        tag = "ApiEmployeeTags::Employee"
    )]
    async fn evaluation_employee_api(
        &self,
        Query(id): Query<i32>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> EvaluationResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "evaluation_employee_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "evaluation_employee_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "evaluation_employee_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return EvaluationResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let data = match get_employee_by_id(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "evaluation_employee_api",
                        "get_employee_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(data) = data else {
            return EvaluationResponses::NotFound(Json(NotFoundResponse::new(format!(
                "employee with id = {} not found",
                id
            ))));
        };
        if !can_view(&user, &data) {
            return EvaluationResponses::Forbidden(Json(ForbiddenResponse::default()));
        }
        EvaluationResponses::Ok(Json(data.into()))
    }

    #[oai(path = "/employee/pms/", method = "put", tag = "ApiEmployeeTags::Employee")]
    async fn pms_employee_api(
        &self,
        Query(id): Query<i32>,
        json: Json<ScoreRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> EvaluationResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "pms_employee_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "pms_employee_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "pms_employee_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return EvaluationResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Manager]) {
            return EvaluationResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let pms = match score("score", json.score) {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };
        let data = match get_employee_by_id(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "pms_employee_api",
                        "get_employee_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut employee) = data else {
            return EvaluationResponses::NotFound(Json(NotFoundResponse::new(format!(
                "employee with id = {} not found",
                id
            ))));
        };

        employee.individual_pms = Some(pms);
        employee.indpms25 = Some(pms_score(pms));
        employee.updated_date = Some(Local::now().fixed_offset());
        recalculate_total(&mut employee);
        if let Err(err) = update_evaluation(&mut tx, &employee).await {
            return EvaluationResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "pms_employee_api",
                    "update_evaluation",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return EvaluationResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "pms_employee_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        EvaluationResponses::Ok(Json(employee.into()))
    }

    #[oai(
        path = "/employee/manager-recommendation/",
        method = "put",
        tag = "ApiEmployeeTags::Employee"
    )]
    async fn manager_recommendation_api(
        &self,
        Query(id): Query<i32>,
        json: Json<ScoreRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> EvaluationResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "manager_recommendation_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "manager_recommendation_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "manager_recommendation_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return EvaluationResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Manager]) {
            return EvaluationResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let recommendation = match score("score", json.score) {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };
        let data = match get_employee_by_id(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "manager_recommendation_api",
                        "get_employee_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut employee) = data else {
            return EvaluationResponses::NotFound(Json(NotFoundResponse::new(format!(
                "employee with id = {} not found",
                id
            ))));
        };

        let now = Local::now().fixed_offset();
        employee.tmdrec20 = Some(manager_recommendation_score(recommendation));
        employee.updated_date = Some(now);
        recalculate_total(&mut employee);
        if let Err(err) = update_evaluation(&mut tx, &employee).await {
            return EvaluationResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "manager_recommendation_api",
                    "update_evaluation",
                    &err.to_string(),
                ),
            ));
        }
        let notification = NotificationData {
            recipient_role: UserRole::DistrictManager.to_string(),
            recipient_id: None,
            notification_type: "recommendation".to_string(),
            title: "Manager recommendation".to_string(),
            message: format!(
                "{} recommended {} with a score of {}",
                user.name, employee.full_name, recommendation
            ),
            employee_id: Some(employee.id.to_string()),
            employee_name: Some(employee.full_name.clone()),
        };
        if let Err(err) = create_notification(&mut tx, notification, Some(now)).await {
            return EvaluationResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "manager_recommendation_api",
                    "create_notification",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return EvaluationResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "manager_recommendation_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        info!("manager {} recommended employee {}", user.id, employee.id);
        EvaluationResponses::Ok(Json(employee.into()))
    }

    #[oai(
        path = "/employee/district-recommendation/",
        method = "put",
        tag = "ApiEmployeeTags::Employee"
    )]
    async fn district_recommendation_api(
        &self,
        Query(id): Query<i32>,
        json: Json<ScoreRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> EvaluationResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "district_recommendation_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "district_recommendation_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "district_recommendation_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return EvaluationResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::DistrictManager]) {
            return EvaluationResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let recommendation = match score("score", json.score) {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };
        let data = match get_employee_by_id(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return EvaluationResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.employee",
                        "district_recommendation_api",
                        "get_employee_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut employee) = data else {
            return EvaluationResponses::NotFound(Json(NotFoundResponse::new(format!(
                "employee with id = {} not found",
                id
            ))));
        };
        if !can_view(&user, &employee) {
            return EvaluationResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let now = Local::now().fixed_offset();
        employee.disrec15 = Some(district_recommendation_score(recommendation));
        employee.updated_date = Some(now);
        recalculate_total(&mut employee);
        if let Err(err) = update_evaluation(&mut tx, &employee).await {
            return EvaluationResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "district_recommendation_api",
                    "update_evaluation",
                    &err.to_string(),
                ),
            ));
        }
        let notification = NotificationData {
            recipient_role: UserRole::Admin.to_string(),
            recipient_id: None,
            notification_type: "recommendation".to_string(),
            title: "District recommendation".to_string(),
            message: format!(
                "{} recommended {} with a score of {}",
                user.name, employee.full_name, recommendation
            ),
            employee_id: Some(employee.id.to_string()),
            employee_name: Some(employee.full_name.clone()),
        };
        if let Err(err) = create_notification(&mut tx, notification, Some(now)).await {
            return EvaluationResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "district_recommendation_api",
                    "create_notification",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return EvaluationResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.employee",
                    "district_recommendation_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        info!(
            "district manager {} recommended employee {}",
            user.id, employee.id
        );
        EvaluationResponses::Ok(Json(employee.into()))
    }
}
