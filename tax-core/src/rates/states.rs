//! State property and payroll tax rules, FY 2024-25.
//!
//! Only NSW, VIC and QLD are configured. Transfer duty tables are the
//! general (non-concessional) rates; land tax tables are for individuals.
//! VIC's 5.5%-of-total-value band between $960,000 and $2,000,000 is
//! expressed as a continuation of the 6% marginal band.

use std::collections::BTreeMap;

use rust_decimal_macros::dec;

use crate::models::{
    ApprenticeRebate, FirstHomeConcession, FirstHomeGrant, Jurisdiction, JurisdictionTaxRules,
    PayrollLevy, TaxBracket, TaxSchedule,
};

pub(super) fn fy2024_25() -> BTreeMap<Jurisdiction, JurisdictionTaxRules> {
    [nsw(), vic(), qld()]
        .into_iter()
        .map(|rules| (rules.jurisdiction, rules))
        .collect()
}

fn nsw() -> JurisdictionTaxRules {
    JurisdictionTaxRules {
        jurisdiction: Jurisdiction::Nsw,
        stamp_duty_schedule: TaxSchedule::new_unchecked(vec![
            TaxBracket::new(dec!(0), Some(dec!(17000)), dec!(0.0125), dec!(0)),
            TaxBracket::new(dec!(17001), Some(dec!(36000)), dec!(0.015), dec!(212)),
            TaxBracket::new(dec!(36001), Some(dec!(97000)), dec!(0.0175), dec!(497)),
            TaxBracket::new(dec!(97001), Some(dec!(364000)), dec!(0.035), dec!(1564)),
            TaxBracket::new(dec!(364001), Some(dec!(1212000)), dec!(0.045), dec!(10909)),
            TaxBracket::new(dec!(1212001), Some(dec!(3636000)), dec!(0.055), dec!(49069)),
            TaxBracket::new(dec!(3636001), None, dec!(0.07), dec!(182389)),
        ]),
        first_home_concession: Some(FirstHomeConcession {
            full_exemption_threshold: dec!(800000),
            concession_ceiling: dec!(1000000),
        }),
        first_home_grant: Some(FirstHomeGrant {
            amount: dec!(10000),
            property_value_cap: dec!(600000),
            new_homes_only: true,
        }),
        land_tax_schedule: TaxSchedule::new_unchecked(vec![
            TaxBracket::new(dec!(0), Some(dec!(1075000)), dec!(0), dec!(0)),
            TaxBracket::new(dec!(1075001), Some(dec!(6571000)), dec!(0.016), dec!(100)),
            TaxBracket::new(dec!(6571001), None, dec!(0.02), dec!(88036)),
        ]),
        land_tax_threshold: dec!(1075000),
        absentee_surcharge_rate: None,
        payroll_tax_threshold: dec!(1200000),
        payroll_tax_rate: dec!(0.0545),
        payroll_levies: vec![],
        apprentice_rebate: None,
    }
}

fn vic() -> JurisdictionTaxRules {
    JurisdictionTaxRules {
        jurisdiction: Jurisdiction::Vic,
        stamp_duty_schedule: TaxSchedule::new_unchecked(vec![
            TaxBracket::new(dec!(0), Some(dec!(25000)), dec!(0.014), dec!(0)),
            TaxBracket::new(dec!(25001), Some(dec!(130000)), dec!(0.024), dec!(350)),
            TaxBracket::new(dec!(130001), Some(dec!(2000000)), dec!(0.06), dec!(2870)),
            TaxBracket::new(dec!(2000001), None, dec!(0.065), dec!(115070)),
        ]),
        first_home_concession: Some(FirstHomeConcession {
            full_exemption_threshold: dec!(600000),
            concession_ceiling: dec!(750000),
        }),
        first_home_grant: Some(FirstHomeGrant {
            amount: dec!(10000),
            property_value_cap: dec!(750000),
            new_homes_only: true,
        }),
        land_tax_schedule: TaxSchedule::new_unchecked(vec![
            TaxBracket::new(dec!(0), Some(dec!(49999)), dec!(0), dec!(0)),
            TaxBracket::new(dec!(50000), Some(dec!(99999)), dec!(0), dec!(500)),
            // The published amounts step at exactly $100,000 and $300,000.
            TaxBracket::new(dec!(100000), Some(dec!(100000)), dec!(0), dec!(975)),
            TaxBracket::new(dec!(100001), Some(dec!(299999)), dec!(0.002), dec!(975)),
            TaxBracket::new(dec!(300000), Some(dec!(300000)), dec!(0.003), dec!(1350)),
            TaxBracket::new(dec!(300001), Some(dec!(600000)), dec!(0.003), dec!(1350)),
            TaxBracket::new(dec!(600001), Some(dec!(1000000)), dec!(0.006), dec!(2250)),
            TaxBracket::new(dec!(1000001), Some(dec!(1800000)), dec!(0.009), dec!(4650)),
            TaxBracket::new(dec!(1800001), Some(dec!(3000000)), dec!(0.0165), dec!(11850)),
            TaxBracket::new(dec!(3000001), None, dec!(0.0265), dec!(31650)),
        ]),
        land_tax_threshold: dec!(49999),
        absentee_surcharge_rate: Some(dec!(0.04)),
        payroll_tax_threshold: dec!(900000),
        payroll_tax_rate: dec!(0.0485),
        payroll_levies: vec![
            PayrollLevy {
                name: "mental health and wellbeing levy".to_string(),
                threshold: dec!(10000000),
                rate: dec!(0.005),
            },
            PayrollLevy {
                name: "mental health and wellbeing levy (additional)".to_string(),
                threshold: dec!(100000000),
                rate: dec!(0.005),
            },
        ],
        apprentice_rebate: None,
    }
}

fn qld() -> JurisdictionTaxRules {
    JurisdictionTaxRules {
        jurisdiction: Jurisdiction::Qld,
        stamp_duty_schedule: TaxSchedule::new_unchecked(vec![
            TaxBracket::new(dec!(0), Some(dec!(5000)), dec!(0), dec!(0)),
            TaxBracket::new(dec!(5001), Some(dec!(75000)), dec!(0.015), dec!(0)),
            TaxBracket::new(dec!(75001), Some(dec!(540000)), dec!(0.035), dec!(1050)),
            TaxBracket::new(dec!(540001), Some(dec!(1000000)), dec!(0.045), dec!(17325)),
            TaxBracket::new(dec!(1000001), None, dec!(0.0575), dec!(38025)),
        ]),
        first_home_concession: Some(FirstHomeConcession {
            full_exemption_threshold: dec!(700000),
            concession_ceiling: dec!(800000),
        }),
        first_home_grant: Some(FirstHomeGrant {
            amount: dec!(30000),
            property_value_cap: dec!(750000),
            new_homes_only: true,
        }),
        land_tax_schedule: TaxSchedule::new_unchecked(vec![
            TaxBracket::new(dec!(0), Some(dec!(599999)), dec!(0), dec!(0)),
            TaxBracket::new(dec!(600000), Some(dec!(600000)), dec!(0), dec!(500)),
            TaxBracket::new(dec!(600001), Some(dec!(1000000)), dec!(0.01), dec!(500)),
            TaxBracket::new(dec!(1000001), None, dec!(0.0165), dec!(4500)),
        ]),
        land_tax_threshold: dec!(599999),
        absentee_surcharge_rate: Some(dec!(0.03)),
        payroll_tax_threshold: dec!(1300000),
        payroll_tax_rate: dec!(0.0475),
        payroll_levies: vec![],
        apprentice_rebate: Some(ApprenticeRebate {
            rate: dec!(0.50),
            cap: None,
        }),
    }
}
