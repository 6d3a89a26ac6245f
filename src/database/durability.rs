//! Read/write concern per operation.
//!
//! The classification is static: an operation whose acknowledged result must
//! survive a primary failover asks for majority, everything else takes the
//! deployment default.

use mongodb::options::{
    Acknowledgment, AggregateOptions, DeleteOptions, InsertOneOptions, ReadConcern, ReplaceOptions,
    UpdateOptions, WriteConcern,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    Majority,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddComment,
    UpdateComment,
    DeleteComment,
    TopCommenters,
    AddUser,
    DeleteUser,
    UpdatePreferences,
    CreateSession,
    DeleteSessions,
}

impl Operation {
    pub const fn durability(self) -> Durability {
        match self {
            Operation::AddComment | Operation::AddUser | Operation::TopCommenters => Durability::Majority,
            Operation::UpdateComment
            | Operation::DeleteComment
            | Operation::DeleteUser
            | Operation::UpdatePreferences
            | Operation::CreateSession
            | Operation::DeleteSessions => Durability::Default,
        }
    }

    pub fn insert_options(self) -> InsertOneOptions {
        let mut options = InsertOneOptions::default();
        options.write_concern = self.durability().write_concern();
        options
    }

    pub fn update_options(self) -> UpdateOptions {
        let mut options = UpdateOptions::default();
        options.write_concern = self.durability().write_concern();
        options
    }

    pub fn replace_options(self) -> ReplaceOptions {
        let mut options = ReplaceOptions::default();
        options.write_concern = self.durability().write_concern();
        options
    }

    pub fn delete_options(self) -> DeleteOptions {
        let mut options = DeleteOptions::default();
        options.write_concern = self.durability().write_concern();
        options
    }

    pub fn aggregate_options(self) -> AggregateOptions {
        let mut options = AggregateOptions::default();
        options.read_concern = self.durability().read_concern();
        options
    }
}

impl Durability {
    pub fn write_concern(self) -> Option<WriteConcern> {
        match self {
            Durability::Majority => {
                let mut concern = WriteConcern::default();
                concern.w = Some(Acknowledgment::Majority);
                Some(concern)
            }
            Durability::Default => None,
        }
    }

    pub fn read_concern(self) -> Option<ReadConcern> {
        match self {
            Durability::Majority => Some(ReadConcern::majority()),
            Durability::Default => None,
        }
    }
}
