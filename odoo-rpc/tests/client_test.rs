use odoo_rpc::{
    ClientConfig, ClientError, Endpoint, IntoWire, OdooClient, Record, RpcRequest, SearchOptions,
    WireValue,
};
use serde_json::{Map, Value, json};

use mock_transport::MockTransport;

fn config() -> ClientConfig {
    ClientConfig {
        url: "https://erp.example.com".to_string(),
        port: "443".to_string(),
        database: "prod".to_string(),
        username: "svc".to_string(),
        password: "secret".to_string(),
    }
}

fn client(transport: MockTransport) -> OdooClient<MockTransport> {
    OdooClient::new(transport, &config())
}

fn object_map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

/// The action name of a recorded `execute` request.
fn action(request: &RpcRequest) -> &str {
    match &request.params[4] {
        WireValue::String(action) => action,
        other => panic!("expected an action string, got {other:?}"),
    }
}

#[tokio::test]
async fn authenticates_once_across_operations() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply_json(json!([1, 2, 3]))
        .reply(WireValue::Int(3));

    let mut client = client(transport);

    let ids = client
        .search("res.partner", json!([]), SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3]);

    let count = client.search_count("res.partner", json!([])).await.unwrap();
    assert_eq!(count, 3);

    assert_eq!(client.session().user_id(), Some(2));
    assert_eq!(client.session().server_version(), Some("9.0"));

    let requests = &client.transport().requests;
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].0, Endpoint::Common);
    assert_eq!(requests[0].1.method, "login");
    assert_eq!(requests[1].0, Endpoint::Common);
    assert_eq!(requests[1].1.method, "version");
    assert_eq!(requests[2].0, Endpoint::Object);
    assert_eq!(requests[3].0, Endpoint::Object);
}

#[tokio::test]
async fn search_sends_the_standard_preamble() {
    let transport = MockTransport::new().logged_in(2, "9.0").reply_json(json!([7]));

    let mut client = client(transport);
    client
        .search(
            "res.partner",
            json!([["name", "ilike", "a"]]),
            SearchOptions::default(),
        )
        .await
        .unwrap();

    let request = &client.transport().requests[2].1;
    assert_eq!(request.method, "execute");
    assert_eq!(
        request.params,
        vec![
            WireValue::String("prod".to_string()),
            WireValue::Int(2),
            WireValue::String("secret".to_string()),
            WireValue::String("res.partner".to_string()),
            WireValue::String("search".to_string()),
            json!([["name", "ilike", "a"]]).into_wire().unwrap(),
            WireValue::Int(0),
            WireValue::Int(100),
            WireValue::String(String::new()),
        ]
    );
}

#[tokio::test]
async fn login_rejects_non_positive_user_id() {
    let transport = MockTransport::new().reply(WireValue::Int(0));

    let mut client = client(transport);
    let err = client
        .search("res.partner", json!([]), SearchOptions::default())
        .await
        .unwrap_err();

    match err {
        ClientError::Authentication { username } => assert_eq!(username, "svc"),
        other => panic!("expected an authentication error, got {other:?}"),
    }
    assert_eq!(client.session().user_id(), None);
}

#[tokio::test]
async fn connection_failure_names_the_database() {
    let transport = MockTransport::new().disconnect("connection refused");

    let mut client = client(transport);
    let err = client
        .search("res.partner", json!([]), SearchOptions::default())
        .await
        .unwrap_err();

    match err {
        ClientError::Connection { database, source } => {
            assert_eq!(database, "prod");
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("expected a connection error, got {other:?}"),
    }
}

#[tokio::test]
async fn faults_surface_verbatim() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .fault(3, "Access Denied");

    let mut client = client(transport);
    let err = client
        .search("res.partner", json!([]), SearchOptions::default())
        .await
        .unwrap_err();

    match err {
        ClientError::Fault(fault) => {
            assert_eq!(fault.code, 3);
            assert_eq!(fault.message, "Access Denied");
        }
        other => panic!("expected a fault, got {other:?}"),
    }
}

#[tokio::test]
async fn search_read_uses_the_native_call_on_new_servers() {
    let rows = json!([
        {"id": 1, "name": "Alice"},
        {"id": 2, "name": "Albert"},
    ]);
    let transport = MockTransport::new().logged_in(2, "9.0").reply_json(rows);

    let mut client = client(transport);
    let result = client
        .search_read(
            "res.partner",
            json!([["name", "ilike", "a"]]),
            SearchOptions::default(),
        )
        .await
        .unwrap();

    let requests = &client.transport().requests;
    assert_eq!(requests.len(), 3);
    assert_eq!(action(&requests[2].1), "search_read");

    assert_eq!(result.len(), 2);
    assert_eq!(result[0], object_map(json!({"id": 1, "name": "Alice"})));
    assert_eq!(result[1], object_map(json!({"id": 2, "name": "Albert"})));
}

#[tokio::test]
async fn search_read_emulates_on_old_servers() {
    // Same logical query and row data as the native-call test; the caller
    // must not be able to tell the two paths apart.
    let rows = json!([
        {"id": 1, "name": "Alice"},
        {"id": 2, "name": "Albert"},
    ]);
    let transport = MockTransport::new()
        .logged_in(2, "7.0")
        .reply_json(json!([1, 2]))
        .reply_json(rows);

    let mut client = client(transport);
    let result = client
        .search_read(
            "res.partner",
            json!([["name", "ilike", "a"]]),
            SearchOptions::default(),
        )
        .await
        .unwrap();

    let requests = &client.transport().requests;
    assert_eq!(requests.len(), 4);
    assert_eq!(action(&requests[2].1), "search");
    assert_eq!(action(&requests[3].1), "read");
    // read carries the ids search produced
    assert_eq!(
        requests[3].1.params[5],
        WireValue::Array(vec![WireValue::Int(1), WireValue::Int(2)])
    );

    assert_eq!(result.len(), 2);
    assert_eq!(result[0], object_map(json!({"id": 1, "name": "Alice"})));
    assert_eq!(result[1], object_map(json!({"id": 2, "name": "Albert"})));
}

fn tagging_ctor(mut data: Map<String, Value>) -> Record {
    data.insert("wrapped".to_string(), json!(true));
    Record::new(data)
}

#[tokio::test]
async fn read_wraps_rows_via_the_model_registry() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply_json(json!([{"id": 1, "parent_ids": [7, 8]}]))
        .reply_json(json!([{"id": 2}]));

    let mut client = client(transport);
    client.add_model_mapping("res.partner", tagging_ctor);

    let records = client
        .read("res.partner", &[1], Map::new())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("wrapped"), Some(&json!(true)));
    assert_eq!(records[0].get("parent_ids.1"), Some(&json!(8)));

    // removing the mapping takes effect on the next read
    client.remove_model_mapping("res.partner");
    let records = client
        .read("res.partner", &[2], Map::new())
        .await
        .unwrap();
    assert_eq!(records[0].get("wrapped"), None);

    // options were empty both times, so no options parameter was sent
    let request = &client.transport().requests[2].1;
    assert_eq!(action(request), "read");
    assert_eq!(request.params.len(), 6);
}

#[tokio::test]
async fn read_forwards_non_empty_options() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply_json(json!([{"name": "Alice"}]));

    let mut client = client(transport);
    client
        .read(
            "res.partner",
            &[1],
            object_map(json!({"fields": ["name"]})),
        )
        .await
        .unwrap();

    let request = &client.transport().requests[2].1;
    assert_eq!(request.params.len(), 7);
    assert_eq!(
        request.params[6],
        json!({"fields": ["name"]}).into_wire().unwrap()
    );
}

#[tokio::test]
async fn create_write_unlink_pass_results_through() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply(WireValue::Int(42))
        .reply(WireValue::Boolean(true))
        .reply(WireValue::Boolean(true));

    let mut client = client(transport);

    let created = client
        .create("res.partner", object_map(json!({"name": "Acme"})))
        .await
        .unwrap();
    assert_eq!(created, json!(42));

    let written = client
        .write("res.partner", 42, object_map(json!({"name": "Acme Ltd"})))
        .await
        .unwrap();
    assert_eq!(written, json!(true));

    let unlinked = client.unlink("res.partner", 42).await.unwrap();
    assert_eq!(unlinked, json!(true));

    let requests = &client.transport().requests;
    assert_eq!(
        requests[2].1.params[5],
        json!({"name": "Acme"}).into_wire().unwrap()
    );
    assert_eq!(
        requests[3].1.params[5],
        WireValue::Array(vec![WireValue::Int(42)])
    );
    assert_eq!(
        requests[3].1.params[6],
        json!({"name": "Acme Ltd"}).into_wire().unwrap()
    );
    assert_eq!(
        requests[4].1.params[5],
        WireValue::Array(vec![WireValue::Int(42)])
    );
}

#[tokio::test]
async fn fields_get_returns_the_metadata_map() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply_json(json!({"name": {"type": "char", "string": "Name"}}));

    let mut client = client(transport);
    let fields = client.fields_get("res.partner").await.unwrap();

    assert_eq!(
        fields,
        object_map(json!({"name": {"type": "char", "string": "Name"}}))
    );
}

#[tokio::test]
async fn version_requires_no_authentication() {
    let transport = MockTransport::new()
        .reply_json(json!({"server_version": "9.0", "protocol_version": 1}));

    let mut client = client(transport);
    let info = client.version().await.unwrap();

    assert_eq!(info["server_version"], json!("9.0"));
    assert_eq!(client.session().user_id(), None);

    let requests = &client.transport().requests;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, Endpoint::Common);
    assert_eq!(requests[0].1.method, "version");
}

#[tokio::test]
async fn resource_ids_resolve_in_one_lookup() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply_json(json!([101, 102]))
        .reply_json(json!([
            {"id": 101, "res_id": 55},
            {"id": 102, "res_id": 56},
        ]));

    let mut client = client(transport);
    let ids = client
        .get_resource_ids(&["mod.x", "mod.y"], None, SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(ids, vec![55, 56]);

    let requests = &client.transport().requests;
    assert_eq!(requests.len(), 4);

    let search = &requests[2].1;
    assert_eq!(
        search.params[3],
        WireValue::String("ir.model.data".to_string())
    );
    assert_eq!(action(search), "search");
    assert_eq!(
        search.params[5],
        json!([["module", "=", "mod"], ["name", "in", ["x", "y"]]])
            .into_wire()
            .unwrap()
    );

    assert_eq!(action(&requests[3].1), "read");
}

#[tokio::test]
async fn resource_ids_with_bare_name_and_model_clause() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply_json(json!([5]))
        .reply_json(json!([{"id": 5, "res_id": 77}]));

    let mut client = client(transport);
    let ids = client
        .get_resource_ids(&["xyz"], Some("res.partner"), SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(ids, vec![77]);

    // bare names get no module clause; the model clause comes last
    let search = &client.transport().requests[2].1;
    assert_eq!(
        search.params[5],
        json!([["name", "in", ["xyz"]], ["model", "=", "res.partner"]])
            .into_wire()
            .unwrap()
    );
}

#[tokio::test]
async fn resource_ids_empty_input_sends_nothing() {
    let mut client = client(MockTransport::new());

    let ids = client
        .get_resource_ids(&[], None, SearchOptions::default())
        .await
        .unwrap();

    assert!(ids.is_empty());
    assert!(client.transport().requests.is_empty());
}

#[tokio::test]
async fn resource_id_missing_resolves_to_none() {
    let transport = MockTransport::new().logged_in(2, "9.0").reply_json(json!([]));

    let mut client = client(transport);
    let id = client.get_resource_id("mod.gone", None).await.unwrap();

    assert_eq!(id, None);
    // search came back empty, so no read round trip followed
    assert_eq!(client.transport().requests.len(), 3);
}

#[tokio::test]
async fn load_groups_records_by_key_shape() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply_json(json!({"ids": [10, 11], "messages": []}))
        // a failed group answers with a boolean sentinel
        .reply(WireValue::Boolean(false));

    let mut client = client(transport);
    let result = client
        .load(
            "res.partner",
            vec![
                object_map(json!({"a": 1, "b": 2})),
                object_map(json!({"a": 3, "b": 4})),
                object_map(json!({"c": 5})),
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.ids, vec![json!(10), json!(11)]);
    assert!(result.messages.is_empty());

    let requests = &client.transport().requests;
    assert_eq!(requests.len(), 4);

    let first = &requests[2].1;
    assert_eq!(action(first), "load");
    assert_eq!(first.params[5], json!(["a", "b"]).into_wire().unwrap());
    assert_eq!(
        first.params[6],
        json!([[1, 2], [3, 4]]).into_wire().unwrap()
    );

    let second = &requests[3].1;
    assert_eq!(second.params[5], json!(["c"]).into_wire().unwrap());
    assert_eq!(second.params[6], json!([[5]]).into_wire().unwrap());
}

#[tokio::test]
async fn load_one_unwraps_the_first_id() {
    let transport = MockTransport::new()
        .logged_in(2, "9.0")
        .reply_json(json!({"ids": [9], "messages": [{"message": "duplicate key"}]}));

    let mut client = client(transport);
    let result = client
        .load_one("res.partner", object_map(json!({"name": "Acme"})))
        .await
        .unwrap();

    assert_eq!(result.id, Some(json!(9)));
    assert_eq!(result.messages, vec![json!({"message": "duplicate key"})]);
}
