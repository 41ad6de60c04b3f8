usecase! {
    get : {
        pub post_id: entities::PostId,
    } => {
        pub post: entities::Post,
    }
}

usecase! {
    like : {
        pub post_id: entities::PostId,
        pub likers: ::std::collections::HashSet<entities::UserId>,
    } => {
        pub post: entities::Post,
    }
}
