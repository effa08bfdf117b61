//! Instrument catalog
//!
//! Display name to Yahoo ticker for the Nifty 50 index and the Bank Nifty
//! sub-index. The two tables are merged once at startup into an immutable
//! [`Catalog`] which is then passed by reference to whoever needs lookups.

use std::collections::HashMap;

use crate::error::{PipelineError, PipelineResult};
use crate::{Instrument, Ticker};

/// Nifty 50 constituents, led by the index itself
pub const NIFTY_50: &[(&str, &str)] = &[
    ("Nifty 50", "^NSEI"),
    ("ADANI ENTERPRISES", "ADANIENT.NS"),
    ("ADANI PORTS", "ADANIPORTS.NS"),
    ("APOLLO HOSPITALS", "APOLLOHOSP.NS"),
    ("ASIAN PAINTS", "ASIANPAINT.NS"),
    ("AXIS BANK", "AXISBANK.NS"),
    ("BAJAJ AUTO", "BAJAJ-AUTO.NS"),
    ("BAJAJ FINANCE", "BAJFINANCE.NS"),
    ("BAJAJ FINSERV", "BAJAJFINSV.NS"),
    ("BHARTI AIRTEL", "BHARTIARTL.NS"),
    ("BPCL", "BPCL.NS"),
    ("BRITANNIA", "BRITANNIA.NS"),
    ("CIPLA", "CIPLA.NS"),
    ("COAL INDIA", "COALINDIA.NS"),
    ("DIVIS LABORATORIES", "DIVISLAB.NS"),
    ("DR REDDY'S LAB", "DRREDDY.NS"),
    ("EICHER MOTORS", "EICHERMOT.NS"),
    ("GRASIM", "GRASIM.NS"),
    ("HCL TECH", "HCLTECH.NS"),
    ("HDFC BANK", "HDFCBANK.NS"),
    ("HDFC LIFE", "HDFCLIFE.NS"),
    ("HEROMOTOCO", "HEROMOTOCO.NS"),
    ("HINDALCO", "HINDALCO.NS"),
    ("HINDUSTAN UNILEVER", "HINDUNILVR.NS"),
    ("ICICI BANK", "ICICIBANK.NS"),
    ("INDUSIND BANK", "INDUSINDBK.NS"),
    ("INFOSYS", "INFY.NS"),
    ("ITC", "ITC.NS"),
    ("JSW STEEL", "JSWSTEEL.NS"),
    ("KOTAK MAHINDRA BANK", "KOTAKBANK.NS"),
    ("LTIMINDTREE", "LTIM.NS"),
    ("L&T", "LT.NS"),
    ("M&M", "M&M.NS"),
    ("MARUTI SUZUKI", "MARUTI.NS"),
    ("NESTLE INDIA", "NESTLEIND.NS"),
    ("NTPC", "NTPC.NS"),
    ("ONGC", "ONGC.NS"),
    ("PIDILITE INDUSTRIES", "PIDILITIND.NS"),
    ("POWER GRID CORP", "POWERGRID.NS"),
    ("RELIANCE", "RELIANCE.NS"),
    ("SBIN", "SBIN.NS"),
    ("SBI LIFE", "SBILIFE.NS"),
    ("SUN PHARMA", "SUNPHARMA.NS"),
    ("TATA CONSUMER", "TATACONSUM.NS"),
    ("TATA MOTORS", "TATAMOTORS.NS"),
    ("TATA STEEL", "TATASTEEL.NS"),
    ("TCS", "TCS.NS"),
    ("TECH MAHINDRA", "TECHM.NS"),
    ("TITAN", "TITAN.NS"),
    ("ULTRATECH CEMENT", "ULTRACEMCO.NS"),
    ("UPL", "UPL.NS"),
    ("WIPRO", "WIPRO.NS"),
];

/// Bank Nifty constituents
pub const BANK_NIFTY: &[(&str, &str)] = &[
    ("AU Small Finance Bank", "AUBANK.NS"),
    ("Axis Bank", "AXISBANK.NS"),
    ("Bandhan Bank", "BANDHANBNK.NS"),
    ("Bank of Baroda", "BANKBARODA.NS"),
    ("Federal Bank", "FEDERALBNK.NS"),
    ("HDFC Bank", "HDFCBANK.NS"),
    ("ICICI Bank", "ICICIBANK.NS"),
    ("IDFC First Bank", "IDFCFIRSTB.NS"),
    ("IndusInd Bank", "INDUSINDBK.NS"),
    ("Kotak Mahindra Bank", "KOTAKBANK.NS"),
    ("Punjab National Bank", "PNB.NS"),
    ("State Bank of India", "SBIN.NS"),
];

/// Insertion-ordered, immutable name -> ticker table
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Instrument>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Merge tables in order. A repeated display name keeps its first
    /// position but takes the ticker of the last table that lists it.
    pub fn from_tables(tables: &[&[(&str, &str)]]) -> Self {
        let mut catalog = Catalog::default();
        for table in tables {
            for &(name, ticker) in table.iter() {
                catalog.insert(name, ticker);
            }
        }
        catalog
    }

    /// Nifty 50 merged with Bank Nifty
    pub fn combined() -> Self {
        Self::from_tables(&[NIFTY_50, BANK_NIFTY])
    }

    fn insert(&mut self, name: &str, ticker: &str) {
        match self.index.get(name) {
            Some(&pos) => self.entries[pos].ticker = Ticker::new(ticker),
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push(Instrument::new(name, ticker));
            }
        }
    }

    /// Resolve a display name to its catalog entry
    pub fn lookup(&self, display_name: &str) -> PipelineResult<&Instrument> {
        self.index
            .get(display_name)
            .map(|&pos| &self.entries[pos])
            .ok_or_else(|| PipelineError::LookupFailure {
                name: display_name.to_string(),
            })
    }

    pub fn ticker(&self, display_name: &str) -> PipelineResult<&Ticker> {
        self.lookup(display_name).map(|i| &i.ticker)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|i| i.display_name.as_str())
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
