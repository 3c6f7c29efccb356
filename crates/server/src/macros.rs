/// Generates the CRUD handlers of a named lookup resource.
///
/// `$repo` is the `Session` accessor, `$entity` the `store` entity module,
/// `$kind` the singular used in messages and `$resource` the URL segment.
/// An optional `guard = path` names an async check run before a row is
/// deleted, called as `path(&Session, &Model).await?`.
macro_rules! named_handlers {
    ($repo:ident, $entity:ident, $kind:literal, $resource:literal $(, guard = $guard:path)?) => {
        fn view(model: ::store::$entity::Model) -> ::api_types::named::NamedView {
            ::api_types::named::NamedView {
                id: model.id,
                name: model.name,
            }
        }

        pub async fn list(
            ::axum::extract::State(state): ::axum::extract::State<$crate::ServerState>,
        ) -> Result<::axum::Json<Vec<::api_types::named::NamedView>>, $crate::ServerError> {
            let session = state.session();
            let rows = session.$repo().get_all_ordered_by_name().await?;
            Ok(::axum::Json(rows.into_iter().map(view).collect()))
        }

        pub async fn get(
            ::axum::extract::State(state): ::axum::extract::State<$crate::ServerState>,
            ::axum_extra::extract::WithRejection(
                ::axum::extract::Path($crate::common::IdPath { id }),
                _,
            ): $crate::common::Rejecting<::axum::extract::Path<$crate::common::IdPath>>,
        ) -> Result<::axum::Json<::api_types::named::NamedView>, $crate::ServerError> {
            let session = state.session();
            let model = session.$repo().get_by_id(id).await?.ok_or_else(|| {
                $crate::ServerError::NotFound(format!(concat!($kind, " {} not found"), id))
            })?;
            Ok(::axum::Json(view(model)))
        }

        pub async fn create(
            ::axum::extract::State(state): ::axum::extract::State<$crate::ServerState>,
            ::axum_extra::extract::WithRejection(::axum::Json(body), _): $crate::common::Rejecting<
                ::axum::Json<::api_types::named::NameBody>,
            >,
        ) -> Result<::axum::response::Response, $crate::ServerError> {
            let name = $crate::common::required_name(&body.name, $kind)?;
            let session = state.session();
            let repo = session.$repo();
            if repo.exists_by_name(&name).await? {
                return Err($crate::ServerError::Conflict(format!(
                    concat!($kind, " `{}` already exists"),
                    name
                )));
            }

            let model = ::store::$entity::Model::new(name);
            repo.insert(&model);
            repo.save_changes().await?;
            ::tracing::info!(id = %model.id, kind = $kind, "created");

            Ok($crate::common::created($resource, model.id, view(model)))
        }

        pub async fn update(
            ::axum::extract::State(state): ::axum::extract::State<$crate::ServerState>,
            ::axum_extra::extract::WithRejection(
                ::axum::extract::Path($crate::common::IdPath { id }),
                _,
            ): $crate::common::Rejecting<::axum::extract::Path<$crate::common::IdPath>>,
            ::axum_extra::extract::WithRejection(::axum::Json(body), _): $crate::common::Rejecting<
                ::axum::Json<::api_types::named::NameBody>,
            >,
        ) -> Result<::axum::http::StatusCode, $crate::ServerError> {
            let session = state.session();
            let repo = session.$repo();
            let mut model = repo.get_by_id(id).await?.ok_or_else(|| {
                $crate::ServerError::NotFound(format!(concat!($kind, " {} not found"), id))
            })?;

            let name = $crate::common::required_name(&body.name, $kind)?;
            if let Some(other) = repo.get_by_name(&name).await? {
                if other.id != id {
                    return Err($crate::ServerError::Conflict(format!(
                        concat!($kind, " `{}` already exists"),
                        name
                    )));
                }
            }

            model.name = name;
            repo.update(&model);
            repo.save_changes().await?;

            Ok(::axum::http::StatusCode::NO_CONTENT)
        }

        pub async fn delete(
            ::axum::extract::State(state): ::axum::extract::State<$crate::ServerState>,
            ::axum_extra::extract::WithRejection(
                ::axum::extract::Path($crate::common::IdPath { id }),
                _,
            ): $crate::common::Rejecting<::axum::extract::Path<$crate::common::IdPath>>,
        ) -> Result<::axum::http::StatusCode, $crate::ServerError> {
            let session = state.session();
            let repo = session.$repo();
            let model = repo.get_by_id(id).await?.ok_or_else(|| {
                $crate::ServerError::NotFound(format!(concat!($kind, " {} not found"), id))
            })?;

            $( $guard(&session, &model).await?; )?
            repo.delete(&model);
            repo.save_changes().await?;
            ::tracing::info!(id = %id, kind = $kind, "deleted");

            Ok(::axum::http::StatusCode::NO_CONTENT)
        }
    };
}
