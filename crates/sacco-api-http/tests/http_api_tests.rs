use sacco_api_http::HttpLoanApi;
use sacco_core::{ApiError, LoanApi};
use sacco_domain::{
    ApplicantType, Guarantor, LineItemSubmission, LoanApplicationId, LoanApplicationRequest,
    NextOfKin,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> LoanApplicationRequest {
    LoanApplicationRequest {
        product_id: Uuid::new_v4(),
        applicant_type: ApplicantType::Member,
        owner_id: "user-1".into(),
        member_id: Some("M-001".into()),
        amount: 50000.0,
        term_days: 180,
        mobile_number: "0712345678".into(),
        occupation: "Teacher".into(),
        loan_purpose: "School fees".into(),
        first_name: "Wanjiku".into(),
        last_name: "Kamau".into(),
        email: "wanjiku@example.co.ke".into(),
        address: "Nairobi".into(),
        date_of_birth: None,
        gender: None,
        group_id: None,
    }
}

fn product_json(id: Uuid) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Biashara Loan",
        "minAmount": 1000.0,
        "maxAmount": 100000.0,
        "minTermDays": 30,
        "maxTermDays": 365,
        "interestRate": 12.0,
        "interestMethod": "FLAT",
        "requiresGuarantor": true
    })
}

#[tokio::test]
async fn lists_products_for_applicant_type() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/loan-products/active"))
        .and(query_param("applicantType", "non-member"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(id)])))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpLoanApi::new(server.uri()).unwrap();
    let products = api
        .list_active_loan_products(ApplicantType::NonMember)
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, id);
    assert!(products[0].requires_guarantor);
    assert!(products[0].is_active);
}

#[tokio::test]
async fn accepts_wrapped_product_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loan-products/active"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [product_json(Uuid::new_v4())] })),
        )
        .mount(&server)
        .await;

    let api = HttpLoanApi::new(server.uri()).unwrap();
    let products = api
        .list_active_loan_products(ApplicantType::Member)
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
}

#[tokio::test]
async fn creates_application_with_bearer_token() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/loan-applications"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({
            "ownerId": "user-1",
            "memberId": "M-001",
            "termDays": 180,
            "applicantType": "member"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "loanApplicationId": id })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpLoanApi::new(server.uri())
        .unwrap()
        .with_token("secret-token");
    let receipt = api.create_loan_application(&request()).await.unwrap();

    assert_eq!(receipt.loan_application_id, LoanApplicationId::new(id));
}

#[tokio::test]
async fn line_items_carry_the_application_id() {
    let server = MockServer::start().await;
    let id = LoanApplicationId::new(Uuid::new_v4());
    Mock::given(method("POST"))
        .and(path("/guarantors"))
        .and(body_partial_json(json!({
            "loanApplicationId": id,
            "name": "Otieno",
            "idNumber": "12345678"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/next-of-kin"))
        .and(body_partial_json(json!({ "loanApplicationId": id, "phone": "0733000222" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpLoanApi::new(server.uri()).unwrap();
    let guarantor = Guarantor {
        name: "Otieno".into(),
        relationship: "Colleague".into(),
        contact: "0722000111".into(),
        id_number: "12345678".into(),
        guaranteed_amount: 10000.0,
    };
    let kin = NextOfKin {
        name: "Akinyi".into(),
        relationship: "Sister".into(),
        phone: "0733000222".into(),
        email: None,
        address: "Kisumu".into(),
    };

    api.add_guarantor(&LineItemSubmission::new(id, &guarantor))
        .await
        .unwrap();
    api.add_next_of_kin(&LineItemSubmission::new(id, &kin))
        .await
        .unwrap();
}

#[tokio::test]
async fn non_success_status_maps_to_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/loan-applications"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Amount exceeds limit" })),
        )
        .mount(&server)
        .await;

    let api = HttpLoanApi::new(server.uri()).unwrap();
    let err = api.create_loan_application(&request()).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            status: 422,
            message: "Amount exceeds limit".into()
        }
    );
}

#[tokio::test]
async fn malformed_receipt_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/loan-applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "nope" })))
        .mount(&server)
        .await;

    let api = HttpLoanApi::new(server.uri()).unwrap();
    let err = api.create_loan_application(&request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
