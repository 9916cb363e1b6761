//! TypeScript bindings for the API types.
//!
//! Running the tests writes one `.ts` file per exported type into
//! `FARM_TS_OUTPUT_DIR`, or `../ts-bindings` when that is unset.

#[cfg(test)]
mod tests {
    use std::{env, path::PathBuf};

    use ts_rs::TS;

    use crate::api::{
        login::{AccessResponse, DetailResponse, LoginRequest, LoginResponse, RefreshRequest},
        messaging::{ConversationRequest, MarkedRead, UnreadCount},
        status::HealthStatus,
        user::{
            ChangePasswordRequest, CreateUserRequest, HierarchySummary, IndustryData,
            UpdateUserRequest,
        },
    };
    use crate::models::*;

    #[test]
    fn generate_typescript_types() {
        let output_dir = env::var("FARM_TS_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("../ts-bindings"));
        std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");

        macro_rules! export {
            ($($ty:ty),+ $(,)?) => {
                $(
                    <$ty>::export_all_to(&output_dir)
                        .unwrap_or_else(|e| panic!("Failed to export {}: {}", stringify!($ty), e));
                )+
            };
        }

        export!(
            // Records
            Industry,
            Role,
            User,
            UserResponse,
            Plot,
            Farm,
            Task,
            Booking,
            InventoryItemWithStatus,
            Stock,
            Vendor,
            OrderWithItems,
            ConversationSummary,
            Message,
            // Request bodies
            IndustryInput,
            IndustryChanges,
            PlotInput,
            PlotChanges,
            FarmInput,
            FarmChanges,
            TaskInput,
            TaskChanges,
            BookingInput,
            BookingChanges,
            InventoryItemInput,
            InventoryItemChanges,
            StockInput,
            StockChanges,
            VendorInput,
            VendorChanges,
            OrderInput,
            OrderChanges,
            MessageInput,
            ConversationRequest,
            LoginRequest,
            RefreshRequest,
            CreateUserRequest,
            UpdateUserRequest,
            ChangePasswordRequest,
            // Responses
            LoginResponse,
            AccessResponse,
            DetailResponse,
            HierarchySummary,
            IndustryData,
            UnreadCount,
            MarkedRead,
            HealthStatus,
        );

        println!("TypeScript types generated in {:?}", output_dir);
    }
}
