use article_service::{
    AppError,
    models::{
        Article, ArticleDefaults, ArticleDraft, ArticleUpdate, DeleteResult, MISSING_FIELDS,
        UpdateArticleRequest,
    },
};
use chrono::Utc;
use ts_rs::TS;
use uuid::Uuid;

fn complete_draft() -> ArticleDraft {
    ArticleDraft {
        title: Some("A".to_string()),
        description: Some("B".to_string()),
        content: Some("C".to_string()),
        seo_keyword: Some("x".to_string()),
        ..ArticleDraft::default()
    }
}

#[test]
fn test_defaults_match_record_shape() {
    let defaults = ArticleDefaults::default();
    assert_eq!(defaults.status, 1);
    assert_eq!(defaults.sort_order, 1);
    assert_eq!(defaults.browse, 0);
}

#[test]
fn test_draft_fills_defaults() {
    let draft = complete_draft();
    draft.validate().unwrap();

    let article = draft.into_new_article("uploads/articles/1--a.png".to_string());

    assert_eq!(article.status, 1);
    assert_eq!(article.sort_order, 1);
    assert_eq!(article.browse, 0);
    assert_eq!(article.img_url, "uploads/articles/1--a.png");
    article.validate().unwrap();
}

#[test]
fn test_draft_requires_text_fields() {
    let cases = [
        ArticleDraft { title: None, ..complete_draft() },
        ArticleDraft { description: Some(String::new()), ..complete_draft() },
        ArticleDraft { content: Some(" \n ".to_string()), ..complete_draft() },
        ArticleDraft { seo_keyword: None, ..complete_draft() },
    ];

    for draft in cases {
        match draft.validate() {
            Err(AppError::Validation(message)) => assert_eq!(message, MISSING_FIELDS),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}

#[test]
fn test_draft_rejects_negative_browse() {
    let draft = ArticleDraft {
        browse: Some(-3),
        ..complete_draft()
    };
    assert!(matches!(draft.validate(), Err(AppError::Validation(_))));
}

#[test]
fn test_update_request_parses_nested_partial_fields() {
    let request: UpdateArticleRequest =
        serde_json::from_str(r#"{"article": {"title": "New", "status": 0}}"#).unwrap();

    assert_eq!(request.article.title.as_deref(), Some("New"));
    assert_eq!(request.article.status, Some(0));
    assert!(request.article.content.is_none());
    assert!(request.article.touches_unique_fields());
}

#[test]
fn test_update_serializes_only_supplied_fields() {
    let update = ArticleUpdate {
        title: Some("New Title Only".to_string()),
        ..Default::default()
    };

    let json_output = serde_json::to_string(&update).unwrap();
    assert_eq!(json_output, r#"{"title":"New Title Only"}"#);
}

#[test]
fn test_update_rejects_blanking_required_text() {
    let update = ArticleUpdate {
        content: Some(String::new()),
        ..Default::default()
    };
    assert!(matches!(update.validate(), Err(AppError::Validation(_))));

    let ok = ArticleUpdate {
        status: Some(0),
        ..Default::default()
    };
    ok.validate().unwrap();
    assert!(!ok.touches_unique_fields());
}

#[test]
fn test_update_apply_leaves_created_alone() {
    let created = Utc::now();
    let mut article = Article {
        id: Uuid::new_v4(),
        title: "T".to_string(),
        browse: 4,
        created,
        ..Article::default()
    };

    ArticleUpdate {
        browse: Some(9),
        seo_keyword: Some("k".to_string()),
        ..Default::default()
    }
    .apply_to(&mut article);

    assert_eq!(article.browse, 9);
    assert_eq!(article.seo_keyword, "k");
    assert_eq!(article.title, "T");
    assert_eq!(article.created, created);
}

#[test]
fn test_delete_result_wire_shape() {
    let json_output = serde_json::to_value(DeleteResult::removed(0)).unwrap();
    assert_eq!(
        json_output,
        serde_json::json!({ "acknowledged": true, "deletedCount": 0 })
    );
}

#[test]
fn test_update_binding_marks_updated_nullable() {
    let decl = ArticleUpdate::decl();
    assert!(
        decl.contains("updated: string | null") || decl.contains("updated?: string | null"),
        "unexpected binding: {decl}"
    );
}
