#[cfg(test)]
pub mod forest_tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use blog_backend_databases::models::Comment;
    use blog_backend_databases::query_parameters::DbOrder;
    use blog_backend_databases::repositories::CommentRepository;

    fn comment(id: Uuid, parent_id: Option<Uuid>, depth: i32, minutes_ago: i64) -> Comment {
        let created_at = Utc::now() - Duration::minutes(minutes_ago);
        Comment {
            id,
            post_id: Uuid::from_u128(1),
            author_id: Uuid::from_u128(2),
            parent_id,
            depth,
            content: String::from("..."),
            likes_count: 0,
            replies_count: 0,
            report_count: 0,
            is_hidden: false,
            hidden_by: None,
            hidden_reason: None,
            hidden_cause: None,
            hidden_at: None,
            created_at,
            edited_at: created_at,
        }
    }

    #[test]
    fn orders_newest_first_at_every_level() {
        let root_old = Uuid::from_u128(10);
        let root_new = Uuid::from_u128(11);
        let child_old = Uuid::from_u128(12);
        let child_new = Uuid::from_u128(13);

        let forest = CommentRepository::build_forest(
            vec![
                comment(root_old, None, 0, 60),
                comment(root_new, None, 0, 5),
                comment(child_old, Some(root_old), 1, 40),
                comment(child_new, Some(root_old), 1, 20),
            ],
            3,
            DbOrder::Desc,
        );

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].comment.id, root_new);
        assert_eq!(forest[1].comment.id, root_old);
        assert_eq!(forest[1].replies[0].comment.id, child_new);
        assert_eq!(forest[1].replies[1].comment.id, child_old);
    }

    #[test]
    fn oldest_first_when_asked() {
        let root_old = Uuid::from_u128(10);
        let root_new = Uuid::from_u128(11);

        let forest = CommentRepository::build_forest(
            vec![comment(root_new, None, 0, 5), comment(root_old, None, 0, 60)],
            3,
            DbOrder::Asc,
        );

        assert_eq!(forest[0].comment.id, root_old);
        assert_eq!(forest[1].comment.id, root_new);
    }

    #[test]
    fn depth_bound_leaves_deeper_branches_unattached() {
        let root = Uuid::from_u128(20);
        let level1 = Uuid::from_u128(21);
        let level2 = Uuid::from_u128(22);
        let level3 = Uuid::from_u128(23);

        let mut level2_comment = comment(level2, Some(level1), 2, 20);
        level2_comment.replies_count = 1;

        let forest = CommentRepository::build_forest(
            vec![
                comment(root, None, 0, 50),
                comment(level1, Some(root), 1, 40),
                level2_comment,
                comment(level3, Some(level2), 3, 10),
            ],
            2,
            DbOrder::Desc,
        );

        let level2_node = &forest[0].replies[0].replies[0];
        assert_eq!(level2_node.comment.id, level2);
        // The branch below the bound stays a count-only placeholder.
        assert!(level2_node.replies.is_empty());
        assert_eq!(level2_node.comment.replies_count, 1);
    }

    #[test]
    fn children_of_absent_parents_surface_at_top_level() {
        let root = Uuid::from_u128(30);
        let orphan = Uuid::from_u128(31);

        let forest = CommentRepository::build_forest(
            vec![
                comment(root, None, 0, 50),
                // Parent never loaded (hidden), the child must not vanish.
                comment(orphan, Some(Uuid::from_u128(99)), 1, 10),
            ],
            3,
            DbOrder::Desc,
        );

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].comment.id, orphan);
        assert_eq!(forest[1].comment.id, root);
    }
}

#[cfg(test)]
pub mod taxonomy_tests {
    use blog_backend_databases::error::{BusinessLogicErrorKind, ErrorClass};
    use blog_backend_databases::query_parameters::Pagination;

    #[test]
    fn kinds_map_to_their_classes() {
        assert_eq!(
            BusinessLogicErrorKind::CommentDoesNotExist.class(),
            ErrorClass::NotFound
        );
        assert_eq!(
            BusinessLogicErrorKind::CommentEditForbidden.class(),
            ErrorClass::Forbidden
        );
        assert_eq!(
            BusinessLogicErrorKind::CommentDepthExceeded.class(),
            ErrorClass::InvalidState
        );
        assert_eq!(
            BusinessLogicErrorKind::InvalidModerationAction.class(),
            ErrorClass::InvalidAction
        );
        assert_eq!(
            BusinessLogicErrorKind::RetryableConflict.class(),
            ErrorClass::Conflict
        );
    }

    #[test]
    fn pagination_metadata_is_computed() {
        let middle = Pagination::new(2, 10, 35);
        assert_eq!(middle.total_pages, 4);
        assert_eq!(middle.offset(), 10);
        assert!(middle.has_next);
        assert!(middle.has_prev);

        let first_of_one = Pagination::new(1, 20, 7);
        assert_eq!(first_of_one.total_pages, 1);
        assert!(!first_of_one.has_next);
        assert!(!first_of_one.has_prev);

        let empty = Pagination::new(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}

#[cfg(test)]
pub mod scenario_tests {
    use std::sync::Arc;

    use sqlx::PgPool;
    use uuid::Uuid;

    use blog_backend_databases::error::{BusinessLogicErrorKind, DbResultSingle, ErrorClass};
    use blog_backend_databases::models::{
        CommentCreate, CommentGetById, CommentHardDelete, PostGetById,
    };
    use blog_backend_databases::repositories::{CommentRepository, PostRepository};
    use blog_backend_databases::{
        DbCreate, DbDelete, DbPoolHandler, DbReadOne, DbRepository, PoolHandler,
    };

    // Fixture ids, see tests/fixtures/*.sql
    const ALICE: &str = "5f0c1a2e-4d3b-4e6a-9a71-0c9a4d2f5b10";
    const BOB: &str = "9b8e2c71-63f4-4f0e-8a3d-2e5b7c4a9f22";
    const CAROL: &str = "1d4f6a92-7b3e-4c5d-b8a0-6f2e9c1d7a33";
    const DAVE: &str = "7a2b9e45-0c8d-4f6e-a1b3-8d5c2f7e9b44";
    const FRANK_ADMIN: &str = "6e9a1c53-2f7b-4d8e-9c4a-5b0d8e2f6a66";
    const POST_PUBLISHED: &str = "b4e7c9a1-5d2f-4a8b-9e3c-7f1a5d8b2c88";

    fn uuid(value: &str) -> Uuid {
        Uuid::parse_str(value).expect("fixture uuid should be valid")
    }

    /// The reply chain stops exactly at depth 3, and the failed creation
    /// leaves no trace on any counter.
    #[sqlx::test(fixtures("users", "posts"))]
    async fn reply_chain_is_bounded(pool: PgPool) -> DbResultSingle<()> {
        let arc_pool = Arc::new(pool);
        let mut comments = CommentRepository::new(PoolHandler::new(arc_pool.clone()));
        let mut posts = PostRepository::new(PoolHandler::new(arc_pool));

        let post_id = uuid(POST_PUBLISHED);

        let c1 = comments
            .create(&CommentCreate::new(&post_id, &uuid(BOB), "Level 0.", None))
            .await?;
        assert_eq!(c1.depth, 0);

        let c2 = comments
            .create(&CommentCreate::new(
                &post_id,
                &uuid(CAROL),
                "Level 1.",
                Some(&c1.id),
            ))
            .await?;
        assert_eq!(c2.depth, 1);

        let c3 = comments
            .create(&CommentCreate::new(
                &post_id,
                &uuid(DAVE),
                "Level 2.",
                Some(&c2.id),
            ))
            .await?;
        assert_eq!(c3.depth, 2);

        let c4 = comments
            .create(&CommentCreate::new(
                &post_id,
                &uuid(BOB),
                "Level 3.",
                Some(&c3.id),
            ))
            .await?;
        assert_eq!(c4.depth, 3);

        let too_deep = comments
            .create(&CommentCreate::new(
                &post_id,
                &uuid(CAROL),
                "Level 4.",
                Some(&c4.id),
            ))
            .await
            .expect_err("depth 4 must not be reachable");
        assert!(too_deep.is_kind(BusinessLogicErrorKind::CommentDepthExceeded));
        assert_eq!(
            too_deep.business_logic_kind().map(|kind| kind.class()),
            Some(ErrorClass::InvalidState)
        );

        let c1_after = comments.read_one(&CommentGetById::new(&c1.id)).await?;
        assert_eq!(c1_after.replies_count, 1);

        let post = posts.read_one(&PostGetById::new(&post_id)).await?;
        assert_eq!(post.comments_count, 4);

        comments.disconnect().await;
        Ok(())
    }

    /// Purging a reply removes its whole subtree, rolls the post total back
    /// by the subtree size, and its parent's reply counter back by one.
    #[sqlx::test(fixtures("users", "posts"))]
    async fn cascade_rolls_back_the_right_counters(pool: PgPool) -> DbResultSingle<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let arc_pool = Arc::new(pool);
        let mut comments = CommentRepository::new(PoolHandler::new(arc_pool.clone()));
        let mut posts = PostRepository::new(PoolHandler::new(arc_pool));

        let post_id = uuid(POST_PUBLISHED);

        let root = comments
            .create(&CommentCreate::new(&post_id, &uuid(BOB), "Root.", None))
            .await?;
        let branch = comments
            .create(&CommentCreate::new(
                &post_id,
                &uuid(CAROL),
                "Branch.",
                Some(&root.id),
            ))
            .await?;
        let leaf = comments
            .create(&CommentCreate::new(
                &post_id,
                &uuid(DAVE),
                "Leaf.",
                Some(&branch.id),
            ))
            .await?;
        comments
            .create(&CommentCreate::new(
                &post_id,
                &uuid(ALICE),
                "Deeper leaf.",
                Some(&leaf.id),
            ))
            .await?;

        let post_before = posts.read_one(&PostGetById::new(&post_id)).await?;
        assert_eq!(post_before.comments_count, 4);

        let removed = comments
            .delete(&CommentHardDelete::new(&branch.id, &uuid(FRANK_ADMIN)))
            .await?;
        assert_eq!(removed.len(), 3);

        let post_after = posts.read_one(&PostGetById::new(&post_id)).await?;
        assert_eq!(post_after.comments_count, 1);

        // The direct parent lost one child link, not three.
        let root_after = comments.read_one(&CommentGetById::new(&root.id)).await?;
        assert_eq!(root_after.replies_count, 0);

        comments.disconnect().await;
        Ok(())
    }
}
