table! {
    activities (id) {
        id -> Int4,
        title -> Varchar,
        description -> Text,
        status -> Varchar,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        hours_reward -> Int4,
        min_xp -> Int4,
        max_xp -> Int4,
        gender_restriction -> Varchar,
        capacity -> Int4,
        created_at -> Timestamp,
    }
}

table! {
    activity_grades (id) {
        id -> Int4,
        activity_id -> Int4,
        grade_id -> Int4,
    }
}

table! {
    announcements (id) {
        id -> Int4,
        title -> Varchar,
        content -> Text,
        created_at -> Timestamp,
    }
}

table! {
    grades (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    messages (id) {
        id -> Int4,
        user_id -> Varchar,
        body -> Varchar,
        color -> Varchar,
        is_visible -> Bool,
        is_anonymous -> Bool,
        created_at -> Timestamp,
    }
}

table! {
    profile_tags (id) {
        id -> Int4,
        profile_id -> Int4,
        tag_id -> Int4,
    }
}

table! {
    profiles (id) {
        id -> Int4,
        user_id -> Varchar,
        student_id -> Varchar,
        class_name -> Varchar,
        gender -> Varchar,
        grade_id -> Nullable<Int4>,
        total_hours -> Int4,
        total_xp -> Int4,
    }
}

table! {
    registrations (id) {
        id -> Int4,
        profile_id -> Int4,
        activity_id -> Int4,
        session_id -> Nullable<Int4>,
        phone -> Varchar,
        class_name -> Varchar,
        teacher_name -> Varchar,
        status -> Varchar,
        hours_awarded -> Int4,
        registered_at -> Timestamp,
    }
}

table! {
    sessions (id) {
        id -> Int4,
        activity_id -> Int4,
        date -> Date,
        start_time -> Time,
        end_time -> Time,
        location -> Varchar,
        capacity -> Int4,
    }
}

table! {
    tags (id) {
        id -> Int4,
        name -> Varchar,
        xp_bonus -> Int4,
    }
}

table! {
    users (id) {
        id -> Varchar,
        name -> Varchar,
        hash_pwd -> Varchar,
        user_role -> Varchar,
        is_active -> Bool,
        joined_at -> Timestamp,
        last_login_at -> Nullable<Timestamp>,
    }
}

joinable!(activity_grades -> activities (activity_id));
joinable!(activity_grades -> grades (grade_id));
joinable!(messages -> users (user_id));
joinable!(profile_tags -> profiles (profile_id));
joinable!(profile_tags -> tags (tag_id));
joinable!(profiles -> grades (grade_id));
joinable!(profiles -> users (user_id));
joinable!(registrations -> activities (activity_id));
joinable!(registrations -> profiles (profile_id));
joinable!(registrations -> sessions (session_id));
joinable!(sessions -> activities (activity_id));

allow_tables_to_appear_in_same_query!(
    activities,
    activity_grades,
    announcements,
    grades,
    messages,
    profile_tags,
    profiles,
    registrations,
    sessions,
    tags,
    users,
);
