use nc_nutrition::{
	seed::{default_foods, seed, SeedOutcome},
	Error, NutritionRecord, NutritionStore, SupabaseConfig, SupabaseStore,
};

use std::{
	collections::HashMap,
	net::{SocketAddr, TcpListener},
	sync::{Arc, Mutex},
};

use axum::{
	extract::{Query, State},
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	routing::get,
	Json, Router,
};
use serde_json::{json, Value};

const KEY: &str = "service-role-key";

#[derive(Default)]
struct Table {
	rows: Mutex<Vec<Value>>,
	fail: bool,
}

fn authorized(headers: &HeaderMap) -> bool {
	headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(KEY)
		&& headers.get("authorization").and_then(|v| v.to_str().ok())
			== Some(format!("Bearer {KEY}").as_str())
}

/// Just enough PostgREST: `name=eq.<value>` filtering and plain inserts
async fn select(
	State(table): State<Arc<Table>>,
	headers: HeaderMap,
	Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
	if !authorized(&headers) {
		return (StatusCode::UNAUTHORIZED, Json(json!({"message": "no api key"})));
	}
	if table.fail {
		return (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(json!({"message": "database is on fire"})),
		);
	}
	assert_eq!(params.get("select").map(String::as_str), Some("*"));

	let name = params
		.get("name")
		.and_then(|filter| filter.strip_prefix("eq."))
		.unwrap_or_default()
		.to_string();

	let rows = table
		.rows
		.lock()
		.unwrap()
		.iter()
		.filter(|row| row["name"] == name.as_str())
		.cloned()
		.collect::<Vec<_>>();

	(StatusCode::OK, Json(Value::Array(rows)))
}

async fn insert(
	State(table): State<Arc<Table>>,
	headers: HeaderMap,
	Json(mut row): Json<Value>,
) -> StatusCode {
	if !authorized(&headers) {
		return StatusCode::UNAUTHORIZED;
	}

	let mut rows = table.rows.lock().unwrap();
	if rows.iter().any(|existing| existing["name"] == row["name"]) {
		return StatusCode::CONFLICT;
	}

	row["id"] = json!(rows.len() + 1);
	rows.push(row);

	StatusCode::CREATED
}

async fn serve(table: Table) -> (SocketAddr, Arc<Table>) {
	let table = Arc::new(table);
	let app = Router::new()
		.route("/rest/v1/foods", get(select).post(insert))
		.with_state(Arc::clone(&table));

	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr = listener.local_addr().unwrap();

	tokio::spawn(async move {
		axum::Server::from_tcp(listener)
			.unwrap()
			.serve(app.into_make_service())
			.await
			.unwrap();
	});

	(addr, table)
}

fn store(addr: SocketAddr, key: &str) -> SupabaseStore {
	SupabaseStore::new(SupabaseConfig::new(&format!("http://{addr}"), key).unwrap()).unwrap()
}

#[tokio::test]
async fn pizza_is_found_unicorn_fruit_is_not() {
	let (addr, _) = serve(Table {
		rows: Mutex::new(vec![json!({
			"id": 1,
			"name": "pizza",
			"calories": 266,
			"protein": 11,
			"carbs": 33,
			"fat": 10
		})]),
		fail: false,
	})
	.await;
	let store = store(addr, KEY);

	assert_eq!(
		store.lookup("pizza").await.unwrap(),
		Some(NutritionRecord::new("pizza", 266.0, 11.0, 33.0, 10.0))
	);
	assert_eq!(store.lookup("unicorn_fruit").await.unwrap(), None);
	assert_eq!(store.lookup("Pizza").await.unwrap(), None);
}

#[tokio::test]
async fn transport_and_status_failures_are_errors_not_misses() {
	let (addr, _) = serve(Table {
		fail: true,
		..Table::default()
	})
	.await;

	assert!(matches!(
		store(addr, KEY).lookup("pizza").await,
		Err(Error::Status { status, ref body }) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
			&& body.contains("on fire")
	));

	assert!(matches!(
		store(addr, "wrong-key").lookup("pizza").await,
		Err(Error::Status { status, .. }) if status == reqwest::StatusCode::UNAUTHORIZED
	));

	// Nothing listens on a freshly released port
	let closed = {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		listener.local_addr().unwrap()
	};
	assert!(matches!(
		store(closed, KEY).lookup("pizza").await,
		Err(Error::Request(_))
	));
}

#[tokio::test]
async fn seeding_inserts_then_skips() {
	let (addr, table) = serve(Table::default()).await;
	let store = store(addr, KEY);

	let first = seed(&store, default_foods()).await;
	assert_eq!(first.len(), 25);
	assert!(first
		.iter()
		.all(|(_, outcome)| matches!(outcome, SeedOutcome::Inserted)));
	assert_eq!(table.rows.lock().unwrap().len(), 25);

	let second = seed(&store, default_foods()).await;
	assert!(second
		.iter()
		.all(|(_, outcome)| matches!(outcome, SeedOutcome::Skipped)));

	assert_eq!(
		store.lookup("guacamole").await.unwrap(),
		Some(NutritionRecord::new("guacamole", 160.0, 2.0, 9.0, 15.0))
	);
}

#[tokio::test]
async fn duplicate_insert_surfaces_the_conflict() {
	let (addr, _) = serve(Table::default()).await;
	let store = store(addr, KEY);
	let espresso = NutritionRecord::new("espresso", 9.0, 0.1, 1.7, 0.2);

	store.insert(espresso.clone()).await.unwrap();
	assert!(matches!(
		store.insert(espresso).await,
		Err(Error::Status { status, .. }) if status == reqwest::StatusCode::CONFLICT
	));
}
