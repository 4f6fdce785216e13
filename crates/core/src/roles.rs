//! User roles and subscription tiers carried by a resolved identity.
//!
//! Both values come from the bearer credential; the core only reads them.
//! Subscription tiers are recorded but never enforced here.

string_enum! {
    /// Platform-wide role of a user account.
    UserRole {
        User => "user",
        Manager => "manager",
        Admin => "admin",
    }
}

string_enum! {
    /// Billing tier of a user account.
    SubscriptionTier {
        Free => "free",
        Basic => "basic",
        Pro => "pro",
        Enterprise => "enterprise",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl Default for SubscriptionTier {
    fn default() -> Self {
        SubscriptionTier::Free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_known_values() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), *role);
        }
        assert_eq!("pro".parse::<SubscriptionTier>().unwrap(), SubscriptionTier::Pro);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "root".parse::<UserRole>().unwrap_err();
        assert!(err.to_string().contains("user, manager, admin"));
    }
}
