//! Diesel table definitions for the pay-cycle schema.
//!
//! These must match `backend/migrations` exactly; `diesel print-schema`
//! against a migrated database regenerates them.

diesel::table! {
    /// Companies an administrator can switch between.
    companies (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        logo -> Nullable<Text>,
        color -> Nullable<Varchar>,
        is_active -> Bool,
    }
}

diesel::table! {
    /// Company employees. Read-only for the pay-cycle manager.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        /// One of `admin`, `manager`, `employee`.
        role -> Varchar,
        department -> Nullable<Varchar>,
        manager_id -> Nullable<Uuid>,
        company_id -> Uuid,
    }
}

diesel::table! {
    /// One row per (user, company, pay cycle) membership.
    ///
    /// Uniqueness is not enforced by the database.
    pay_cycle_assignments (id) {
        id -> Uuid,
        user_id -> Uuid,
        company_id -> Uuid,
        /// Lowercase pay-cycle key.
        pay_cycle -> Varchar,
        created_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(pay_cycle_assignments -> users (user_id));
diesel::joinable!(users -> companies (company_id));

diesel::allow_tables_to_appear_in_same_query!(companies, pay_cycle_assignments, users);
