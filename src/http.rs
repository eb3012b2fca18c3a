use std::time::Instant;

use axum::body::Body;
use axum::extract::{Form, Path, State};
use axum::http::{Request, StatusCode};
use axum::middleware::{from_fn, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use futures_util::TryStreamExt;
use serde::Deserialize;
use tracing::{info, Instrument};

use crate::errors::AppError;
use crate::models::{parse_record_id, Harvest, HarvestFields, Plant, PlantFields, PlantRef};
use crate::views;
use crate::AppState;

/// Fields posted by the create and edit forms.
#[derive(Debug, Default, Deserialize)]
pub struct PlantForm {
    pub plant_name: Option<String>,
    pub variety: Option<String>,
    pub photo: Option<String>,
    pub date_planted: Option<String>,
}

impl From<PlantForm> for PlantFields {
    fn from(form: PlantForm) -> Self {
        PlantFields {
            name: form.plant_name,
            variety: form.variety,
            photo_url: form.photo,
            date_planted: form.date_planted,
        }
    }
}

/// Fields posted by the harvest form on the detail page. The date input
/// shares its name with the plant forms.
#[derive(Debug, Default, Deserialize)]
pub struct HarvestForm {
    pub harvested_amount: Option<String>,
    pub date_planted: Option<String>,
}

impl From<HarvestForm> for HarvestFields {
    fn from(form: HarvestForm) -> Self {
        HarvestFields {
            quantity: form.harvested_amount,
            date: form.date_planted,
        }
    }
}

/// A missing, empty or unparsable form body reads as a form with every field
/// absent.
fn form_or_default<T: Default>(form: Option<Form<T>>) -> T {
    form.map(|Form(fields)| fields).unwrap_or_default()
}

fn detail_url(plant_id: &str) -> String {
    format!("/plant/{plant_id}")
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(plants_list))
        .route("/about", get(about))
        .route("/create", get(create_form).post(create_plant))
        .route("/plant/:plant_id", get(plant_detail))
        .route("/harvest/:plant_id", post(add_harvest))
        .route("/edit/:plant_id", get(edit_form).post(edit_plant))
        .route("/delete/:plant_id", post(delete_plant))
        .fallback(not_found)
        .layer(from_fn(request_tracing_middleware))
        .with_state(state)
}

async fn request_tracing_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let span = tracing::info_span!("http.request", method = %method, route = %route);

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        )
    });
    response
}

pub(crate) async fn plants_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let plants: Vec<Plant> = state.plants.list().await?.try_collect().await?;
    Ok(Html(views::plants_list(&plants)))
}

pub(crate) async fn about() -> Html<String> {
    Html(views::about())
}

pub(crate) async fn create_form() -> Html<String> {
    Html(views::create_form())
}

pub(crate) async fn create_plant(
    State(state): State<AppState>,
    form: Option<Form<PlantForm>>,
) -> Result<Redirect, AppError> {
    let fields = PlantFields::from(form_or_default(form));
    let id = state.plants.create(&fields).await?;
    Ok(Redirect::to(&detail_url(&id.to_hex())))
}

pub(crate) async fn plant_detail(
    State(state): State<AppState>,
    Path(plant_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_record_id(&plant_id)?;
    let plant = state.plants.get(&id).await?;
    let harvests: Vec<Harvest> = state
        .harvests
        .list_by_plant(&PlantRef::from(id))
        .await?
        .try_collect()
        .await?;
    Ok(Html(views::detail(&plant, &harvests)))
}

pub(crate) async fn add_harvest(
    State(state): State<AppState>,
    Path(plant_id): Path<String>,
    form: Option<Form<HarvestForm>>,
) -> Result<Redirect, AppError> {
    let id = parse_record_id(&plant_id)?;
    state
        .harvests
        .create(&PlantRef::from(id), HarvestFields::from(form_or_default(form)))
        .await?;
    Ok(Redirect::to(&detail_url(&id.to_hex())))
}

pub(crate) async fn edit_form(
    State(state): State<AppState>,
    Path(plant_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_record_id(&plant_id)?;
    let plant = state.plants.get(&id).await?;
    Ok(Html(views::edit_form(&plant)))
}

pub(crate) async fn edit_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<String>,
    form: Option<Form<PlantForm>>,
) -> Result<Redirect, AppError> {
    let id = parse_record_id(&plant_id)?;
    let fields = PlantFields::from(form_or_default(form));
    state.plants.update(&id, &fields).await?;
    Ok(Redirect::to(&detail_url(&id.to_hex())))
}

/// Deletes the plant, then its harvests. The two calls are not atomic; a
/// failure in between leaves harvests pointing at a missing plant.
pub(crate) async fn delete_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = parse_record_id(&plant_id)?;
    state.plants.delete(&id).await?;
    state.harvests.delete_by_plant(&PlantRef::from(id)).await?;
    Ok(Redirect::to("/"))
}

pub(crate) async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(views::not_found())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_form_maps_to_plant_fields() {
        let fields: PlantFields = PlantForm {
            plant_name: Some("Tomato".to_string()),
            variety: None,
            photo: Some("http://x/1.jpg".to_string()),
            date_planted: Some("2023-05-01".to_string()),
        }
        .into();
        assert_eq!(fields.name.as_deref(), Some("Tomato"));
        assert_eq!(fields.variety, None);
        assert_eq!(fields.photo_url.as_deref(), Some("http://x/1.jpg"));
        assert_eq!(fields.date_planted.as_deref(), Some("2023-05-01"));
    }

    #[test]
    fn harvest_form_maps_amount_and_date() {
        let fields: HarvestFields = HarvestForm {
            harvested_amount: Some("3 tomatoes".to_string()),
            date_planted: Some("2023-07-01".to_string()),
        }
        .into();
        assert_eq!(fields.quantity.as_deref(), Some("3 tomatoes"));
        assert_eq!(fields.date.as_deref(), Some("2023-07-01"));
    }

    #[test]
    fn missing_form_reads_as_all_fields_absent() {
        let fields = PlantFields::from(form_or_default::<PlantForm>(None));
        assert_eq!(fields, PlantFields::default());
        let harvest = HarvestFields::from(form_or_default::<HarvestForm>(None));
        assert_eq!(harvest, HarvestFields::default());
    }
}
