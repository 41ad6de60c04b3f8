usecase! {
    current : {
        pub user_id: entities::UserId,
    } => {
        pub user: entities::CurrentUser,
    }
}

usecase! {
    save : {
        pub user_id: entities::UserId,
        pub post_id: entities::PostId,
    } => {
        pub record: entities::SavedRecord,
    }
}

usecase! {
    unsave : {
        pub record_id: entities::SavedRecordId,
    } => {
        pub record: entities::SavedRecord,
    }
}
