//! Booking confirmation message.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::pricing::PassengerType;

/// One ticket line in a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationTicket {
    /// Passenger name.
    pub passenger_name: String,
    /// Passenger type.
    pub passenger_type: PassengerType,
    /// Amount paid.
    pub price_paid: Decimal,
    /// Paid from a subscription.
    pub wallet_covered: bool,
}

/// Confirmation handed to the notifier after a sale commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConfirmation {
    /// Recipient address.
    pub recipient: String,
    /// Booking reference.
    pub reference: String,
    /// Route label, e.g. "Dakar - Gorée".
    pub trip_label: String,
    /// Outbound departure.
    pub departure_time: DateTime<Utc>,
    /// Return departure, for round trips.
    pub return_departure_time: Option<DateTime<Utc>>,
    /// Tickets.
    pub tickets: Vec<ConfirmationTicket>,
    /// Amount paid.
    pub total_amount: Decimal,
}

impl BookingConfirmation {
    /// Email subject.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("Confirmation de votre réservation {}", self.reference)
    }

    /// Plain-text email body.
    #[must_use]
    pub fn body(&self, frontend_url: &str) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "Bonjour,\n");
        let _ = writeln!(body, "Votre réservation {} est confirmée.\n", self.reference);
        let _ = writeln!(body, "Traversée : {}", self.trip_label);
        let _ = writeln!(
            body,
            "Départ : {}",
            self.departure_time.format("%d/%m/%Y %H:%M UTC")
        );
        if let Some(ret) = self.return_departure_time {
            let _ = writeln!(body, "Retour : {}", ret.format("%d/%m/%Y %H:%M UTC"));
        }
        let _ = writeln!(body, "\nPassagers :");
        for ticket in &self.tickets {
            let paid = if ticket.wallet_covered {
                "abonnement".to_string()
            } else {
                format!("{} FCFA", ticket.price_paid)
            };
            let _ = writeln!(
                body,
                "  - {} ({}) : {}",
                ticket.passenger_name, ticket.passenger_type, paid
            );
        }
        let _ = writeln!(body, "\nTotal payé : {} FCFA", self.total_amount);
        let _ = writeln!(
            body,
            "\nRetrouvez votre réservation : {}/bookings/{}",
            frontend_url.trim_end_matches('/'),
            self.reference
        );
        let _ = write!(body, "\nBon voyage !");
        body
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_body_lists_tickets() {
        let confirmation = BookingConfirmation {
            recipient: "awa@example.sn".to_string(),
            reference: "NV-1A2B3C4D".to_string(),
            trip_label: "Dakar - Gorée".to_string(),
            departure_time: Utc::now(),
            return_departure_time: None,
            tickets: vec![
                ConfirmationTicket {
                    passenger_name: "Awa Ndiaye".to_string(),
                    passenger_type: PassengerType::Adult,
                    price_paid: dec!(0),
                    wallet_covered: true,
                },
                ConfirmationTicket {
                    passenger_name: "Issa Ndiaye".to_string(),
                    passenger_type: PassengerType::Child,
                    price_paid: dec!(1500),
                    wallet_covered: false,
                },
            ],
            total_amount: dec!(1500),
        };

        assert_eq!(confirmation.subject(), "Confirmation de votre réservation NV-1A2B3C4D");
        let body = confirmation.body("http://localhost:3000/");
        assert!(body.contains("Awa Ndiaye (adult) : abonnement"));
        assert!(body.contains("Issa Ndiaye (child) : 1500 FCFA"));
        assert!(body.contains("http://localhost:3000/bookings/NV-1A2B3C4D"));
        assert!(!body.contains("Retour"));
    }
}
